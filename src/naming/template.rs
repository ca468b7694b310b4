//! `{token}` substitution for filename patterns.
//!
//! Unknown tokens render as the empty string instead of failing. User-supplied custom patterns are
//! expected to contain tokens this version does not know about, and a render must never fail on
//! them. Do not turn this into an error.

/// Render `pattern`, resolving each `{name}` through `lookup`.
///
/// - `{{` and `}}` are literal braces.
/// - `{name:spec}` looks up `name`; the format spec is ignored.
/// - Unknown names and unterminated `{` resolve to nothing.
pub fn render_pattern<'a, F>(pattern: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut out = String::with_capacity(pattern.len() + 32);
    let mut chars = pattern.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let rest = &pattern[idx + 1..];
                let Some(close) = rest.find('}') else {
                    // Unterminated field: drop the remainder.
                    break;
                };
                let field = &rest[..close];
                let name = field.split([':', '!']).next().unwrap_or("").trim();
                if let Some(value) = lookup(name) {
                    out.push_str(value);
                }
                for _ in 0..=field.chars().count() {
                    chars.next();
                }
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                }
                out.push('}');
            }
            _ => out.push(c),
        }
    }

    out
}

/// Names referenced by `{...}` fields in `pattern`, in order of appearance.
pub fn referenced_tokens(pattern: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = pattern;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        if let Some(stripped) = after.strip_prefix('{') {
            rest = stripped;
            continue;
        }
        let Some(close) = after.find('}') else {
            break;
        };
        let name = after[..close].split([':', '!']).next().unwrap_or("").trim();
        if !name.is_empty() {
            names.push(name.to_string());
        }
        rest = &after[close + 1..];
    }
    names
}

#[cfg(test)]
#[path = "../../tests/unit/naming/template.rs"]
mod tests;
