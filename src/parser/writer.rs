use std::path::{Path, PathBuf};

use xxhash_rust::xxh3::xxh3_64;

use super::book::BookRecord;

pub const MAX_TITLE_LENGTH: usize = 112;
const SAFE_PUNCTUATION: &[char] = &[' ', '.', '_', '(', ')', '-'];

/// Splits `Title (Author)` on the last pair of parentheses.
/// Without a usable pair the whole trimmed header is the title.
pub fn title_author(header: &str) -> (&str, &str) {
    let open = header.rfind('(');
    let close = header.rfind(')');
    match (open, close) {
        (Some(open), Some(close)) if open > 0 && close > open => (
            header[..open].trim(),
            header[open + 1..close].trim(),
        ),
        _ => (header.trim(), ""),
    }
}

pub fn safe_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || SAFE_PUNCTUATION.contains(c))
        .take(MAX_TITLE_LENGTH)
        .collect()
}

/// XXH3-64 of the raw header bytes, as 16 hex digits.
pub fn header_hash(header: &str) -> String {
    format!("{:016x}", xxh3_64(header.as_bytes()))
}

pub fn file_name(header: &str) -> String {
    let (title, _) = title_author(header);
    format!("{}_{}.txt", safe_title(title), header_hash(header))
}

pub fn output_path(output_dir: &Path, header: &str) -> PathBuf {
    output_dir.join(file_name(header))
}

/// `Title, Author`, a blank line, then each block followed by a blank line.
pub fn render(header: &str, record: &BookRecord) -> String {
    let (title, author) = title_author(header);
    let mut out = format!("{}, {}\n\n", title, author);
    for block in record.blocks() {
        out.push_str(block);
        out.push('\n');
    }
    out
}
