//! Text-only metrics, computed for every input regardless of language.

use crate::report::TextMetrics;

/// Line, comment, character and word counts for `source`.
///
/// Lines are `\n`-separated, so a trailing newline yields a final empty line.
/// A comment line is one whose trimmed text starts with `//` or `*` (block
/// comment continuation).
pub fn text_metrics(source: &str) -> TextMetrics {
    let mut total_lines = 0;
    let mut code_lines = 0;
    let mut comment_lines = 0;
    for line in source.split('\n') {
        total_lines += 1;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            code_lines += 1;
        }
        if trimmed.starts_with("//") || trimmed.starts_with('*') {
            comment_lines += 1;
        }
    }

    TextMetrics {
        total_lines,
        code_lines,
        comment_lines,
        empty_lines: total_lines - code_lines,
        characters: source.chars().count(),
        words: source.split_whitespace().count(),
    }
}
