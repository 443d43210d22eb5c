use tracing::debug;

use super::book::BookRecord;

/// Recovers blocks from a previously written book file.
///
/// The `Title, Author` line is dropped, along with the blank line after it.
/// The rest is split on blank lines; every block comes back with one
/// trailing `\n`.
pub fn existing_blocks(content: &str) -> Vec<String> {
    let mut lines = content.lines().skip(1).peekable();
    if lines.peek().is_some_and(|l| l.trim().is_empty()) {
        lines.next();
    }

    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(join_block(&current));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(join_block(&current));
    }
    blocks
}

fn join_block(lines: &[&str]) -> String {
    let mut block = lines.join("\n");
    block.push('\n');
    block
}

/// Appends blocks recovered from `content` that `record` does not already
/// hold. Blocks from the current run keep their place at the front.
/// Returns the number of blocks added.
pub fn merge_existing(record: &mut BookRecord, content: &str) -> usize {
    let recovered = existing_blocks(content);
    let total = recovered.len();
    let added = recovered.iter().filter(|b| record.insert(b)).count();
    debug!(recovered = total, added, "merged prior output");
    added
}
