//! Info command implementation.

use crate::utils::savings;
use dotz_lzw::decompress_stream;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// What `dotz info` reports about one file.
#[derive(Debug, Serialize)]
struct StreamInfo {
    file: String,
    max_bits: u8,
    block_mode: bool,
    compressed_size: u64,
    uncompressed_size: u64,
    savings_percent: f64,
}

pub fn cmd_info(path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = BufReader::new(File::open(path)?);
    let (stats, config) = decompress_stream(&mut reader, &mut io::sink())?;

    let info = StreamInfo {
        file: path.display().to_string(),
        max_bits: config.max_bits,
        block_mode: config.block_mode,
        compressed_size: stats.bytes_read,
        uncompressed_size: stats.bytes_written,
        savings_percent: savings(stats.bytes_written, stats.bytes_read),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("File Information");
    println!("================");
    println!("File: {}", info.file);
    println!("Format: compress (.Z)");
    println!("Max code width: {} bits", info.max_bits);
    println!(
        "Block mode: {}",
        if info.block_mode { "yes" } else { "no" }
    );
    println!("Compressed size: {} bytes", info.compressed_size);
    println!("Uncompressed size: {} bytes", info.uncompressed_size);
    if info.uncompressed_size > 0 {
        println!("Compression ratio: {:.1}%", info.savings_percent);
    }
    Ok(())
}
