//! Log file discovery and reading.
//!
//! A log path is either a file, read as-is, or a directory holding the
//! current log and its rotations:
//!
//! ```text
//! /var/log/pacman.log.2.gz
//! /var/log/pacman.log.1
//! /var/log/pacman.log
//! ```
//!
//! Rotations are read oldest first (highest number first), then the current
//! file. Files ending in `.gz` or `.bz2` are decompressed on the fly.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use glob::{Pattern, glob};

/// Separates multiple paths given with `--path`.
pub const PATH_SEPARATOR: char = ':';

/// Expands the configured log paths into the ordered list of files to read.
///
/// With no `paths`, the directory of `default_log` is used. Fails when the
/// last file of any path does not exist.
pub fn resolve(paths: Option<&str>, default_log: &Path) -> Result<Vec<PathBuf>> {
    let paths: Vec<PathBuf> = match paths {
        Some(paths) => paths
            .split(PATH_SEPARATOR)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect(),
        None => vec![
            default_log
                .parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
        ],
    };

    let basename = default_log
        .file_name()
        .context("default log path has no file name")?
        .to_string_lossy();

    let mut files = Vec::new();
    for path in paths {
        let list = if path.is_dir() {
            rotated_files(&path, &basename)?
        } else {
            vec![path]
        };

        if let Some(last) = list.last() {
            if !last.exists() {
                bail!("{} does not exist", last.display());
            }
        }
        files.extend(list);
    }

    tracing::debug!(?files, "resolved log files");
    Ok(files)
}

/// Lists `dir/basename.*` by rotation number, descending, then `dir/basename`.
fn rotated_files(dir: &Path, basename: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/{}.*",
        Pattern::escape(&dir.to_string_lossy()),
        Pattern::escape(basename)
    );

    let mut rotated: Vec<(u64, PathBuf)> = Vec::new();
    for entry in glob(&pattern).context("invalid log path pattern")? {
        let path = match entry {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(error = %e, "error accessing rotated log file");
                continue;
            }
        };
        let number = path
            .file_name()
            .map(|name| rotation_number(&name.to_string_lossy(), basename))
            .unwrap_or_default();
        rotated.push((number, path));
    }

    rotated.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    let mut files: Vec<PathBuf> = rotated.into_iter().map(|(_, path)| path).collect();
    files.push(dir.join(basename));
    Ok(files)
}

/// The digits in a rotated file name after the base name, e.g. 12 for
/// `pacman.log.12.gz`.
fn rotation_number(name: &str, basename: &str) -> u64 {
    name.strip_prefix(basename)
        .unwrap_or(name)
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

/// Opens a log file, decompressing it when it ends in `.gz` or `.bz2`.
pub fn open(path: &Path) -> Result<Box<dyn BufRead>> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
    if ext.eq_ignore_ascii_case("gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else if ext.eq_ignore_ascii_case("bz2") {
        Ok(Box::new(BufReader::new(BzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Calls `each` with every line of `reader`, decoding invalid UTF-8 lossily.
pub fn read_lines<R, F>(mut reader: R, mut each: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(&str) -> Result<()>,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        each(&String::from_utf8_lossy(&buf))?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    use bzip2::write::BzEncoder;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tempfile::TempDir;

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_rotation_number() {
        assert_eq!(rotation_number("pacman.log.12.gz", "pacman.log"), 12);
        assert_eq!(rotation_number("pacman.log.old", "pacman.log"), 0);
        assert_eq!(rotation_number("history.log.3", "history.log"), 3);
    }

    #[test]
    fn test_directory_lists_rotations_oldest_first() {
        let temp = TempDir::new().unwrap();
        for name in ["history.log", "history.log.1.gz", "history.log.10.gz", "history.log.2.gz"] {
            fs::write(temp.path().join(name), "").unwrap();
        }
        fs::write(temp.path().join("other.log"), "").unwrap();

        let default_log = Path::new("/var/log/apt/history.log");
        let files = resolve(Some(&temp.path().to_string_lossy()), default_log).unwrap();
        assert_eq!(
            names(&files),
            ["history.log.10.gz", "history.log.2.gz", "history.log.1.gz", "history.log"]
        );
    }

    #[test]
    fn test_multiple_paths_keep_order() {
        let temp = TempDir::new().unwrap();
        let old = temp.path().join("old.log");
        let new = temp.path().join("new.log");
        fs::write(&old, "").unwrap();
        fs::write(&new, "").unwrap();

        let paths = format!("{}:{}", old.display(), new.display());
        let files = resolve(Some(&paths), Path::new("/var/log/pacman.log")).unwrap();
        assert_eq!(files, [old, new]);
    }

    #[test]
    fn test_missing_current_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("pacman.log.1"), "").unwrap();

        let err = resolve(
            Some(&temp.path().to_string_lossy()),
            Path::new("/var/log/pacman.log"),
        )
        .unwrap_err();
        assert!(err.to_string().ends_with("pacman.log does not exist"), "{err}");
    }

    #[test]
    fn test_gzip_and_invalid_utf8_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("log.1.gz");
        let mut encoder = GzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"first line\nbad \xff byte\nlast").unwrap();
        encoder.finish().unwrap();

        let mut lines = Vec::new();
        read_lines(open(&path).unwrap(), |line| {
            lines.push(line.trim_end().to_string());
            Ok(())
        })
        .unwrap();
        assert_eq!(lines, ["first line", "bad \u{fffd} byte", "last"]);
    }

    #[test]
    fn test_bzip2_rotation_is_decompressed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pacman.log.1.bz2");
        let mut encoder =
            BzEncoder::new(fs::File::create(&path).unwrap(), bzip2::Compression::default());
        encoder.write_all(b"one\ntwo\n").unwrap();
        encoder.finish().unwrap();

        let mut lines = Vec::new();
        read_lines(open(&path).unwrap(), |line| {
            lines.push(line.trim_end().to_string());
            Ok(())
        })
        .unwrap();
        assert_eq!(lines, ["one", "two"]);
    }
}
