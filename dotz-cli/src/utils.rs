//! Utility functions for the CLI.

use dialoguer::Confirm;
use filetime::FileTime;
use indicatif::{ProgressBar, ProgressStyle};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

/// Suffix of compressed files.
pub const SUFFIX: &str = ".Z";

/// Create a byte-count progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
            .expect("progress bar template is valid")
            .progress_chars("█▓▒░ "),
    );
    pb
}

/// Whether `path` already carries the `.Z` suffix.
pub fn has_suffix(path: &Path) -> bool {
    path.extension() == Some(OsStr::new(&SUFFIX[1..]))
}

/// `FILE` -> `FILE.Z`.
pub fn compressed_name(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(SUFFIX);
    PathBuf::from(name)
}

/// Resolve a decompression argument into (input, output).
///
/// `FILE.Z` decompresses to `FILE`; a bare `FILE` is taken to mean `FILE.Z`.
pub fn decompressed_names(path: &Path) -> (PathBuf, PathBuf) {
    if has_suffix(path) {
        (path.to_path_buf(), path.with_extension(""))
    } else {
        (compressed_name(path), path.to_path_buf())
    }
}

/// Decide whether an existing `output` may be replaced.
///
/// Asks on an interactive terminal; refuses otherwise.
pub fn may_overwrite(output: &Path, force: bool) -> Result<bool, Box<dyn std::error::Error>> {
    if force || !output.exists() {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        eprintln!("{} already exists; not overwritten", output.display());
        return Ok(false);
    }
    let answer = Confirm::new()
        .with_prompt(format!("{} already exists; overwrite?", output.display()))
        .default(false)
        .interact()?;
    if !answer {
        eprintln!("\tnot overwritten");
    }
    Ok(answer)
}

/// Give `target` the permissions and access/modification times of `source`.
pub fn copy_file_times(source: &fs::Metadata, target: &Path) -> io::Result<()> {
    fs::set_permissions(target, source.permissions())?;
    let atime = FileTime::from_last_access_time(source);
    let mtime = FileTime::from_last_modification_time(source);
    filetime::set_file_times(target, atime, mtime)
}

/// Space saved as a percentage of `original`.
pub fn savings(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        0.0
    } else {
        (1.0 - compressed as f64 / original as f64) * 100.0
    }
}
