pub mod generation;
pub mod product_types;
pub mod templates;

/// Collapses whitespace runs into single spaces and strips control characters.
pub(crate) fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}

/// Trims each line and drops control characters other than newlines.
pub(crate) fn sanitize_multiline_text(input: &str) -> String {
    input
        .trim()
        .lines()
        .map(|line| {
            line.trim()
                .chars()
                .filter(|ch| !ch.is_control())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
