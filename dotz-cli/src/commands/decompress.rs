//! Decompress command implementation.

use super::FileOptions;
use crate::utils::{copy_file_times, create_progress_bar, decompressed_names, may_overwrite};
use dotz_lzw::{StreamStats, ZConfig, decompress_stream};
use log::debug;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub fn cmd_decompress(
    files: &[PathBuf],
    options: &FileOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    if files.is_empty() {
        let stdout = io::stdout();
        let mut writer = BufWriter::new(stdout.lock());
        let (stats, config) = decompress_stream(&mut io::stdin().lock(), &mut writer)?;
        writer.flush()?;
        debug!(
            "stdin: {} bits, {} bytes in, {} bytes out",
            config.max_bits, stats.bytes_read, stats.bytes_written
        );
        return Ok(());
    }

    let mut failed = 0usize;
    for path in files {
        if let Err(e) = decompress_file(path, options) {
            eprintln!("{}: {}", path.display(), e);
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} files failed", failed, files.len()).into());
    }
    Ok(())
}

fn decompress_file(path: &Path, options: &FileOptions) -> Result<(), Box<dyn std::error::Error>> {
    let (input, output) = decompressed_names(path);
    let metadata = fs::metadata(&input)?;

    let pb = create_progress_bar(metadata.len(), options.progress);
    pb.set_message(input.display().to_string());
    let mut reader = pb.wrap_read(BufReader::new(File::open(&input)?));

    if options.stdout {
        let stdout = io::stdout();
        let mut writer = BufWriter::new(stdout.lock());
        decompress_stream(&mut reader, &mut writer)?;
        writer.flush()?;
        pb.finish_and_clear();
        return Ok(());
    }

    if !may_overwrite(&output, options.force)? {
        return Ok(());
    }

    let result = decode_to(&mut reader, &output);
    pb.finish_and_clear();
    let (stats, config) = match result {
        Ok(done) => done,
        Err(e) => {
            let _ = fs::remove_file(&output);
            return Err(e);
        }
    };

    copy_file_times(&metadata, &output)?;
    if !options.keep {
        fs::remove_file(&input)?;
    }

    if options.verbose {
        eprintln!(
            "{}: {} bits, {} -> {} bytes -- replaced with {}",
            input.display(),
            config.max_bits,
            stats.bytes_read,
            stats.bytes_written,
            output.display()
        );
    }
    Ok(())
}

fn decode_to<R: Read>(
    reader: &mut R,
    output: &Path,
) -> Result<(StreamStats, ZConfig), Box<dyn std::error::Error>> {
    let mut writer = BufWriter::new(File::create(output)?);
    let done = decompress_stream(reader, &mut writer)?;
    writer.flush()?;
    Ok(done)
}
