//! Compress command implementation.

use super::FileOptions;
use crate::utils::{
    SUFFIX, compressed_name, copy_file_times, create_progress_bar, has_suffix, may_overwrite,
    savings,
};
use dotz_lzw::{StreamStats, ZConfig, compress_stream};
use log::debug;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub fn cmd_compress(
    files: &[PathBuf],
    bits: u8,
    block_mode: bool,
    options: &FileOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ZConfig::new(bits).with_block_mode(block_mode);
    config.validate()?;

    if files.is_empty() {
        let stdout = io::stdout();
        let mut writer = BufWriter::new(stdout.lock());
        let stats = compress_stream(&mut io::stdin().lock(), &mut writer, config)?;
        writer.flush()?;
        if options.verbose {
            eprintln!(
                "Compression: {:.2}%",
                savings(stats.bytes_read, stats.bytes_written)
            );
        }
        return Ok(());
    }

    let mut failed = 0usize;
    for path in files {
        if let Err(e) = compress_file(path, config, options) {
            eprintln!("{}: {}", path.display(), e);
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} files failed", failed, files.len()).into());
    }
    Ok(())
}

fn compress_file(
    path: &Path,
    config: ZConfig,
    options: &FileOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    if has_suffix(path) {
        eprintln!("{}: already has {} suffix -- unchanged", path.display(), SUFFIX);
        return Ok(());
    }

    let metadata = fs::metadata(path)?;
    if !metadata.is_file() {
        eprintln!("{}: not a regular file -- ignored", path.display());
        return Ok(());
    }

    let pb = create_progress_bar(metadata.len(), options.progress);
    pb.set_message(path.display().to_string());
    let mut reader = pb.wrap_read(BufReader::new(File::open(path)?));

    if options.stdout {
        let stdout = io::stdout();
        let mut writer = BufWriter::new(stdout.lock());
        let stats = compress_stream(&mut reader, &mut writer, config)?;
        writer.flush()?;
        pb.finish_and_clear();
        if options.verbose {
            eprintln!(
                "{}: Compression: {:.2}%",
                path.display(),
                savings(stats.bytes_read, stats.bytes_written)
            );
        }
        return Ok(());
    }

    let output = compressed_name(path);
    if !may_overwrite(&output, options.force)? {
        return Ok(());
    }

    let result = encode_to(&mut reader, &output, config);
    pb.finish_and_clear();
    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            let _ = fs::remove_file(&output);
            return Err(e);
        }
    };
    debug!(
        "{}: {} bytes in, {} bytes out",
        path.display(),
        stats.bytes_read,
        stats.bytes_written
    );

    if !options.force && stats.bytes_written >= stats.bytes_read {
        fs::remove_file(&output)?;
        if options.verbose {
            eprintln!("{}: No compression -- file unchanged", path.display());
        }
        return Ok(());
    }

    copy_file_times(&metadata, &output)?;
    if !options.keep {
        fs::remove_file(path)?;
    }

    if options.verbose {
        eprintln!(
            "{}: Compression: {:.2}% -- replaced with {}",
            path.display(),
            savings(stats.bytes_read, stats.bytes_written),
            output.display()
        );
    }
    Ok(())
}

fn encode_to<R: Read>(
    reader: &mut R,
    output: &Path,
    config: ZConfig,
) -> Result<StreamStats, Box<dyn std::error::Error>> {
    let mut writer = BufWriter::new(File::create(output)?);
    let stats = compress_stream(reader, &mut writer, config)?;
    writer.flush()?;
    Ok(stats)
}
