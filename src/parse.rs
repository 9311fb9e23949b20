//! Helper functions to interpret string inputs.

use crate::error::Error;
use std::ffi::OsString;
use std::{fs::DirEntry, path::Path};

/// Takes a string, and splits it into two parts, separated by the first
/// instance of the given character. The first item in the pair is `Some`
/// unless the input string is empty. The second item in the pair is `None` if
/// `separator` is not found in the string.
pub fn split_pair(string: &str, separator: char) -> (Option<&str>, Option<&str>) {
    let mut a = string.splitn(2, separator);
    let n = a.next().filter(|s| !s.is_empty());
    let p = a.next();
    (n, p)
}

/// Splits a model parameter string of the form `key=value:key=value` into
/// its pairs. Empty items are skipped; an item without `=` is an
/// `InvalidSetup` error.
pub fn parameter_pairs(string: &str) -> Result<Vec<(&str, &str)>, Error> {
    string
        .split(':')
        .filter(|item| !item.trim().is_empty())
        .map(|item| match split_pair(item, '=') {
            (Some(key), Some(value)) => Ok((key.trim(), value.trim())),
            _ => Err(Error::InvalidSetup(format!("expected key=value, got '{}'", item))),
        })
        .collect()
}

/// Parses a floating point model parameter, naming the key on failure.
pub fn parse_parameter(key: &str, value: &str) -> Result<f64, Error> {
    value
        .parse()
        .map_err(|e| Error::InvalidSetup(format!("{}={}: {}", key, value, e)))
}

/// Returns the parent directory for an absolute path string, or `None` if no
/// parent directory exists. If the path is relative this function returns
/// `Some(".")`.
pub fn parent_dir(path: &str) -> Option<&str> {
    Path::new(path)
        .parent()
        .and_then(Path::to_str)
        .map(|s| if s.is_empty() { "." } else { s })
}

/// Attempts to interpret the given string as a directory and read its
/// contents. If that succeeds, then returns the path of the last entry in the
/// directory, sorted alphabetically, which ends with `extension`. If no
/// matching files are found or if `dir` was not a directory, then returns
/// `None`.
pub fn last_in_dir_ending_with(dir: &str, extension: &str) -> Option<String> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut entries = entries.collect::<Result<Vec<DirEntry>, _>>().ok()?;
    entries.retain(|e| e.file_name().to_str().map_or(false, |n| n.ends_with(extension)));
    entries.sort_by_key(DirEntry::file_name);
    entries
        .last()
        .map(DirEntry::file_name)
        .map(OsString::into_string)
        .and_then(Result::ok)
        .map(|name| format!("{}/{}", dir.trim_end_matches('/'), name))
}
