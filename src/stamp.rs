use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::NaiveDateTime;

const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Appends one ISO-8601 timestamp line, creating the file if needed.
pub fn append(path: &Path, at: NaiveDateTime) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", at.format(FORMAT))
}

/// Most recent timestamp recorded, `None` if no run was ever stamped.
pub fn last(path: &Path) -> io::Result<Option<String>> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    Ok(content
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string))
}
