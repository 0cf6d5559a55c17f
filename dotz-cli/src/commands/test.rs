//! Test command implementation.

use dotz_lzw::decompress_stream;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

pub fn cmd_test(files: &[PathBuf], verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut errors: Vec<(String, String)> = Vec::new();

    for path in files {
        let result = File::open(path)
            .map_err(dotz_lzw::DotzError::from)
            .and_then(|file| decompress_stream(&mut BufReader::new(file), &mut io::sink()));

        match result {
            Ok((stats, config)) => {
                if verbose {
                    println!(
                        "  OK: {} ({} bits, {} bytes)",
                        path.display(),
                        config.max_bits,
                        stats.bytes_written
                    );
                }
            }
            Err(e) => {
                println!("  FAILED: {} - {}", path.display(), e);
                errors.push((path.display().to_string(), e.to_string()));
            }
        }
    }

    println!();
    println!(
        "Tested {} files: {} OK, {} failed",
        files.len(),
        files.len() - errors.len(),
        errors.len()
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!("{} files failed integrity test", errors.len()).into())
    }
}
