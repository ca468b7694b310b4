//! Filesystem-safe name components and removal of embedded resolution/aspect tokens.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Video container extensions accepted as input and stripped from source names.
pub const VIDEO_EXTENSIONS: [&str; 4] = [".mp4", ".mov", ".m4v", ".mkv"];

/// Upper bound for a generated filename, extension included.
pub const MAX_FILENAME_LEN: usize = 120;

/// Fallback component used whenever sanitizing leaves nothing behind.
pub const FALLBACK_STEM: &str = "clip";

// The regex crate has no look-around, so each token rule captures its non-alphanumeric boundary
// characters (`pre`/`post`) and puts them back around the replacement space.
const BOUNDARY_PRE: &str = r"(?P<pre>^|[^\p{L}\p{N}])";
const BOUNDARY_POST: &str = r"(?P<post>[^\p{L}\p{N}]|$)";
const WRAP_OPEN: &str = r"[\(\[\{<_-]*";
const WRAP_CLOSE: &str = r"[\)\]\}>_-]*";

struct TokenRule {
    name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

fn regex(source: &str, name: &str) -> Regex {
    Regex::new(source).unwrap_or_else(|e| panic!("invalid {name} pattern: {e}"))
}

fn token_rule(name: &'static str, body: &str) -> TokenRule {
    let source = format!("(?i){BOUNDARY_PRE}{WRAP_OPEN}\\s*{body}\\s*{WRAP_CLOSE}{BOUNDARY_POST}");
    TokenRule {
        name,
        pattern: regex(&source, name),
        replacement: "${pre} ${post}",
    }
}

// Single-digit sides only, so times, dates and episode numbers (`10:30`, `12/25`, `12x05`)
// survive. Common wide ratios are listed explicitly.
fn aspect_ratio_body() -> String {
    const SEP: &str = r"\s*(?:x|×|:|/|\s+by\s+)\s*";
    format!(r"(?:16{SEP}9|9{SEP}16|21{SEP}9|9{SEP}21|\d(?:\.\d+)?{SEP}\d(?:\.\d+)?)")
}

static TOKEN_RULES: LazyLock<[TokenRule; 3]> = LazyLock::new(|| {
    [
        token_rule(
            "resolution",
            r"\d{3,4}\s*(?:x|×|\*|/|:|-|_|\.|\s+by\s+)\s*\d{3,4}\s*(?:px)?",
        ),
        token_rule("aspect_ratio", &aspect_ratio_body()),
        token_rule("aspect_word", r"(?:portrait|vertical|landscape|square)"),
    ]
});

static SEPARATOR_RUN: LazyLock<Regex> = LazyLock::new(|| regex(r"[._\-]{2,}", "separator_run"));
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| regex(r"\s+", "whitespace_run"));
static UNSAFE_RUN: LazyLock<Regex> = LazyLock::new(|| regex(r"[^A-Za-z0-9._-]+", "unsafe_run"));
static UNDERSCORE_RUN: LazyLock<Regex> = LazyLock::new(|| regex(r"_+", "underscore_run"));
static DOUBLE_UNDERSCORE_RUN: LazyLock<Regex> =
    LazyLock::new(|| regex(r"_{2,}", "double_underscore_run"));
static DOUBLE_DASH_RUN: LazyLock<Regex> = LazyLock::new(|| regex(r"-{2,}", "double_dash_run"));

/// Replace unsafe characters with `_`, collapse underscores, and trim separators.
///
/// Never returns an empty string.
pub fn sanitize_component(text: &str) -> String {
    let replaced = UNSAFE_RUN.replace_all(text, "_");
    let collapsed = UNDERSCORE_RUN.replace_all(&replaced, "_");
    let trimmed = collapsed.trim_matches(|c| matches!(c, '_' | '-' | '.' | ' '));
    if trimmed.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Split a name into `(stem, ".ext")` the way a path extension split works: the dot must not be
/// the leading character of the final component.
pub fn split_extension(name: &str) -> (&str, &str) {
    let component_start = name.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    let component = &name[component_start..];
    let leading_dots = component.len() - component.trim_start_matches('.').len();
    match component.rfind('.') {
        Some(dot) if dot >= leading_dots && dot > 0 => {
            let split = component_start + dot;
            (&name[..split], &name[split..])
        }
        _ => (name, ""),
    }
}

pub fn is_video_extension(ext: &str) -> bool {
    VIDEO_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(ext))
}

/// Remove trailing video extensions, repeatedly, so `clip.mp4.mp4` becomes `clip`.
pub fn strip_known_extensions(name: &str) -> &str {
    let mut base = name;
    loop {
        let (stem, ext) = split_extension(base);
        if stem.is_empty() || !is_video_extension(ext) {
            return base;
        }
        base = stem;
    }
}

/// Remove embedded resolution, aspect-ratio and orientation-word tokens from a name.
///
/// Every rule runs to a fixed point before the next one starts; afterwards separator runs become a
/// single space and whitespace is collapsed.
pub fn remove_naming_tokens(text: &str) -> String {
    let mut cleaned = text.to_string();
    for rule in TOKEN_RULES.iter() {
        loop {
            let next = rule.pattern.replace_all(&cleaned, rule.replacement);
            if next == cleaned {
                break;
            }
            tracing::trace!(rule = rule.name, before = %cleaned, after = %next, "stripped naming token");
            cleaned = next.into_owned();
        }
    }
    let cleaned = SEPARATOR_RUN.replace_all(&cleaned, " ");
    let cleaned = WHITESPACE_RUN.replace_all(&cleaned, " ");
    cleaned.trim().to_string()
}

/// Source name to a clean, sanitized stem: extensions stripped and, unless `keep_tokens`, embedded
/// resolution/aspect tokens removed.
pub fn clean_stub(original_name: &str, keep_tokens: bool) -> String {
    let base = strip_known_extensions(original_name).trim();
    if keep_tokens {
        sanitize_component(base)
    } else {
        sanitize_component(&remove_naming_tokens(base))
    }
}

/// Derive the final on-disk filename for `candidate` with extension `ext`.
///
/// Double underscores and double dashes survive (collapsed to exactly two) because generated names
/// use them as field separators. The result never exceeds [`MAX_FILENAME_LEN`]; only the stem is
/// truncated.
pub fn sanitize_filename(candidate: &str, ext: &str) -> String {
    let wanted_ext = ext.trim_start_matches('.');
    let (stem, current_ext) = split_extension(candidate);
    let stem = if is_video_extension(current_ext)
        || (!wanted_ext.is_empty() && current_ext.eq_ignore_ascii_case(&format!(".{wanted_ext}")))
    {
        stem
    } else {
        candidate
    };

    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem };
    let stem = UNSAFE_RUN.replace_all(stem, "_");
    let stem = DOUBLE_UNDERSCORE_RUN.replace_all(&stem, "__");
    let stem = DOUBLE_DASH_RUN.replace_all(&stem, "--");
    let stem = WHITESPACE_RUN.replace_all(&stem, "_");
    let stem = stem.trim_matches(|c| matches!(c, '_' | '-' | '.'));
    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem };

    let full_ext = if wanted_ext.is_empty() {
        current_ext.to_string()
    } else {
        format!(".{wanted_ext}")
    };

    let max_stem = MAX_FILENAME_LEN.saturating_sub(full_ext.len()).max(1);
    let stem = truncate_chars(stem, max_stem);
    format!("{stem}{full_ext}")
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Return `filename`, or `stem__NNN.ext` with the first free counter if it already exists in
/// `directory`.
///
/// Only correct with a single writer per directory.
pub fn ensure_unique_name(directory: &Path, filename: &str) -> String {
    if !directory.join(filename).exists() {
        return filename.to_string();
    }
    let (stem, ext) = split_extension(filename);
    let mut counter = 1u32;
    loop {
        let candidate = format!("{stem}__{counter:03}{ext}");
        if !directory.join(&candidate).exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Reduce an uploaded filename to a safe basename, or `None` when nothing usable remains.
pub fn secure_original_name(raw: &str) -> Option<String> {
    let basename = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let joined = WHITESPACE_RUN.replace_all(basename.trim(), "_");
    let safe: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let safe = safe.trim_start_matches(['.', '_']).trim_end_matches('.');
    if safe.is_empty() {
        None
    } else {
        Some(safe.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/naming/sanitize.rs"]
mod tests;
