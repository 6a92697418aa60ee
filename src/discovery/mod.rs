//! Finding the files worth processing.
//!
//! A corpus directory is walked recursively, version-control internals are
//! skipped, and every WML file, map, mask, and saved game is collected in
//! sorted order so reports for the same campaign cluster together.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use walkdir::WalkDir;

use crate::error::Result;

const VCS_DIRS: &[&str] = &[".svn", ".git", ".hg"];

/// Media extensions that can never be saved games, checked before the
/// content sniff so binaries are not opened.
const RESOURCE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "ogg", "wav", "mp3", "ttf", "otf", "po", "pot",
];

/// Whether the file is a terrain grid by extension.
pub fn is_map(filename: &str) -> bool {
    filename.ends_with(".map") || filename.ends_with(".mask")
}

/// Whether the file is WML proper.
pub fn is_wml(filename: &str) -> bool {
    filename.ends_with(".cfg")
}

fn is_resource(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| RESOURCE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Whether the file is a saved game: its first line is a `label=`
/// attribute. Compressed saves are sniffed through gzip.
pub fn is_save(path: &Path) -> bool {
    if is_resource(path) {
        return false;
    }
    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut first_line = String::new();
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        let mut reader = BufReader::new(GzDecoder::new(file));
        if reader.read_line(&mut first_line).is_err() {
            return false;
        }
    } else {
        let mut reader = BufReader::new(file);
        if reader.read_line(&mut first_line).is_err() {
            return false;
        }
    }
    first_line.starts_with("label=")
}

/// Whether the file should be processed at all.
pub fn interesting(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    (name.ends_with(".cfg") && !name.ends_with("_info.cfg")) || is_map(name) || is_save(path)
}

/// Collect every interesting file under `root`, sorted by path.
///
/// A plain file is returned as-is when it qualifies; directories are
/// walked with version-control subtrees pruned.
pub fn interesting_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if !root.is_dir() {
        if interesting(root) {
            files.push(root.to_path_buf());
        }
        return files;
    }
    let walker = WalkDir::new(root).into_iter().filter_entry(|e| {
        e.file_name()
            .to_str()
            .map(|n| !VCS_DIRS.contains(&n))
            .unwrap_or(true)
    });
    for entry in walker.filter_map(|e| e.ok()) {
        if entry.file_type().is_file() && interesting(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    files
}

/// Read a file to text, decompressing saved games stored gzipped.
pub fn read_file_text(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut text = String::new();
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        GzDecoder::new(file).read_to_string(&mut text)?;
    } else {
        BufReader::new(file).read_to_string(&mut text)?;
    }
    Ok(text)
}
