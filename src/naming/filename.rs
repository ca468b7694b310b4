use std::path::Path;

use crate::catalog::{AspectKey, StyleKind};
use crate::naming::policy::{LabelMode, NamingPolicy};
use crate::naming::sanitize::{
    clean_stub, ensure_unique_name, sanitize_component, sanitize_filename, strip_known_extensions,
};
use crate::naming::template::render_pattern;

/// Per-source name components, derived once and reused for every output of that source.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BaseNameInfo {
    /// Sanitized stem of the source (or override) name.
    pub base: String,
    /// `base` with embedded resolution/aspect tokens removed when the policy asks for it.
    pub base_clean: String,
    pub original_filename: String,
}

/// Derive [`BaseNameInfo`] for `original_name`, preferring a non-blank `override_name`.
pub fn prepare_base_info(
    original_name: &str,
    override_name: Option<&str>,
    policy: &NamingPolicy,
) -> BaseNameInfo {
    let source_name = override_name
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .unwrap_or(original_name);
    let candidate = strip_known_extensions(source_name).trim();
    let base = sanitize_component(candidate);
    let base_clean = if policy.strips_tokens() {
        clean_stub(candidate, false)
    } else {
        base.clone()
    };
    BaseNameInfo {
        base,
        base_clean,
        original_filename: original_name.to_string(),
    }
}

/// Token values used to render one output filename.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct NameTokens {
    pub base: String,
    pub base_clean: String,
    pub ratio: String,
    pub style: String,
    pub w: String,
    pub h: String,
    pub date: String,
    /// Zero-padded sequence number, empty when none was given.
    pub seq: String,
    pub ext: String,
}

impl NameTokens {
    pub fn build(
        base_info: &BaseNameInfo,
        aspect: AspectKey,
        style: StyleKind,
        policy: &NamingPolicy,
        seq_number: Option<u32>,
        ext: &str,
    ) -> Self {
        let target = aspect.target();
        let (ratio, style_label) = match policy.label_mode {
            LabelMode::Short => (target.short, style.short_label()),
            LabelMode::Friendly => (target.label, style.label()),
        };
        Self {
            base: base_info.base.clone(),
            base_clean: base_info.base_clean.clone(),
            ratio: ratio.to_string(),
            style: style_label.to_string(),
            w: target.size.width.to_string(),
            h: target.size.height.to_string(),
            date: policy.date_stamp.clone(),
            seq: seq_number.map(|n| format!("{n:03}")).unwrap_or_default(),
            ext: ext.trim_start_matches('.').to_string(),
        }
    }

    /// Look up a token by name. Anything outside the closed token set is `None`.
    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "base" => &self.base,
            "base_clean" => &self.base_clean,
            "ratio" => &self.ratio,
            "style" => &self.style,
            "w" => &self.w,
            "h" => &self.h,
            "date" => &self.date,
            "seq" => &self.seq,
            "ext" => &self.ext,
            _ => return None,
        };
        Some(value.as_str())
    }
}

/// Result of [`generate_output_filename`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct GeneratedName {
    /// Final, unique, on-disk filename.
    pub filename: String,
    pub tokens: NameTokens,
}

impl GeneratedName {
    /// Ratio label as rendered into the name (short or friendly).
    pub fn ratio_token(&self) -> &str {
        &self.tokens.ratio
    }

    pub fn style_token(&self) -> &str {
        &self.tokens.style
    }
}

/// Apply the policy pattern for one `(source, ratio, style, sequence)` and make it unique within
/// `output_dir`.
///
/// Only reads the directory; the caller creates the file.
pub fn generate_output_filename(
    base_info: &BaseNameInfo,
    aspect: AspectKey,
    style: StyleKind,
    policy: &NamingPolicy,
    seq_number: Option<u32>,
    ext: &str,
    output_dir: &Path,
) -> GeneratedName {
    let tokens = NameTokens::build(base_info, aspect, style, policy, seq_number, ext);

    let pattern = if policy.pattern.is_empty() {
        crate::naming::policy::DEFAULT_PATTERN
    } else {
        policy.pattern.as_str()
    };
    let rendered = render_pattern(pattern, |name| tokens.get(name));
    let mut formatted = rendered
        .trim_matches(|c| matches!(c, '_' | '-' | ' '))
        .to_string();
    if formatted.is_empty() {
        formatted = format!("{}_{}", tokens.base_clean, tokens.ratio);
    }

    let normalized_pattern = pattern.to_lowercase();
    if policy.add_sequence && !normalized_pattern.contains("{seq}") && !tokens.seq.is_empty() {
        formatted = format!("{formatted}__{}", tokens.seq);
    }
    if policy.append_date && !normalized_pattern.contains("{date}") && !tokens.date.is_empty() {
        formatted = format!("{formatted}__{}", tokens.date);
    }

    let filename = sanitize_filename(&formatted, ext);
    let filename = ensure_unique_name(output_dir, &filename);
    GeneratedName { filename, tokens }
}

#[cfg(test)]
#[path = "../../tests/unit/naming/filename.rs"]
mod tests;
