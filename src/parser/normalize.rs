/// Canonical form of a block: trailing whitespace and blank lines removed,
/// then exactly one `\n` appended. Idempotent.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 1);
    out.push_str(text.trim_end());
    out.push('\n');
    out
}
