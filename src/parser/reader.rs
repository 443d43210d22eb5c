use std::io::{self, BufRead};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use super::book::Books;

static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*==========\s*$").unwrap());

#[derive(Debug, PartialEq, Eq)]
enum HeaderLine<'a> {
    /// Empty line between entries. Nothing is consumed.
    Blank,
    /// Only the stray marker character; the title itself is missing.
    MarkerOnly,
    Header(&'a str),
}

fn classify_header(line: &str) -> HeaderLine<'_> {
    if line.is_empty() {
        return HeaderLine::Blank;
    }
    let mut chars = line.chars();
    let header = match chars.next() {
        Some(first) if !first.is_alphanumeric() => chars.as_str(),
        _ => line,
    };
    if header.is_empty() {
        HeaderLine::MarkerOnly
    } else {
        HeaderLine::Header(header)
    }
}

fn is_separator(line: &str) -> bool {
    SEPARATOR_RE.is_match(line)
}

/// Reads the next line into `buf` without its terminators.
/// Returns false at end of stream.
fn next_line<R: BufRead>(input: &mut R, buf: &mut String) -> io::Result<bool> {
    buf.clear();
    if input.read_line(buf)? == 0 {
        return Ok(false);
    }
    let kept = buf.trim_end_matches(['\r', '\n']).len();
    buf.truncate(kept);
    Ok(true)
}

/// Accumulates lines up to the next separator or end of stream.
/// Blank lines are dropped, every other line keeps one `\n`, and one
/// extra `\n` closes the block.
fn read_block<R: BufRead>(input: &mut R, buf: &mut String) -> io::Result<String> {
    let mut block = String::new();
    while next_line(input, buf)? {
        if is_separator(buf) {
            break;
        }
        if !buf.is_empty() {
            block.push_str(buf);
            block.push('\n');
        }
    }
    block.push('\n');
    Ok(block)
}

/// Groups a clippings stream into per-book records.
pub fn read_books<R: BufRead>(mut input: R) -> io::Result<Books> {
    let mut books = Books::new();
    let mut line = String::new();
    let mut buf = String::new();
    let mut entries = 0usize;
    let mut duplicates = 0usize;

    while next_line(&mut input, &mut line)? {
        match classify_header(&line) {
            HeaderLine::Blank => continue,
            HeaderLine::MarkerOnly => {
                let dropped = read_block(&mut input, &mut buf)?;
                warn!(
                    chars = dropped.trim_end().chars().count(),
                    "header line has no title, discarding its block"
                );
            }
            HeaderLine::Header(header) => {
                let block = read_block(&mut input, &mut buf)?;
                entries += 1;
                if !books.add(header, &block) {
                    duplicates += 1;
                    debug!(header, "duplicate block skipped");
                }
            }
        }
    }

    debug!(entries, duplicates, books = books.len(), "clippings read");
    Ok(books)
}
