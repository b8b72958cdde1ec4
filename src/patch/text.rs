//! Literal text edits on embedded source strings.
//!
//! Nothing here understands JavaScript, SQL or markup. Strings are matched
//! byte-for-byte.

/// Replaces every occurrence of `find` in `haystack`.
///
/// Returns the new text and the number of occurrences replaced. An empty
/// `find` never matches.
pub fn replace_literal(haystack: &str, find: &str, replace: &str) -> (String, usize) {
    if find.is_empty() {
        return (haystack.to_string(), 0);
    }
    let count = haystack.matches(find).count();
    if count == 0 {
        return (haystack.to_string(), 0);
    }
    (haystack.replace(find, replace), count)
}

/// Drops every line that is empty or whitespace-only.
///
/// Lines are split on `\n` and rejoined with `\n`; a trailing newline is
/// therefore not kept. Returns the new text and the number of lines removed.
pub fn strip_blank_lines(text: &str) -> (String, usize) {
    let mut removed = 0;
    let kept: Vec<&str> = text
        .split('\n')
        .filter(|line| {
            let keep = !line.trim().is_empty();
            if !keep {
                removed += 1;
            }
            keep
        })
        .collect();
    (kept.join("\n"), removed)
}

/// First line of a literal, shortened for log and report output.
pub fn preview(literal: &str) -> String {
    const MAX_CHARS: usize = 48;
    let first_line = literal.trim_start().lines().next().unwrap_or("");
    let truncated: String = first_line.chars().take(MAX_CHARS).collect();
    if truncated.len() < first_line.len() || literal.trim().lines().count() > 1 {
        format!("{}…", truncated)
    } else {
        truncated
    }
}
