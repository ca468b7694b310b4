//! Resolution of the per-batch naming policy.
//!
//! A policy is resolved once, persisted with the batch summary, and reused unchanged by every file
//! rendered into that batch so the pattern and date stamp stay consistent.

use crate::naming::template::referenced_tokens;

/// Date stamp format (`YYYY-MM-DD`, UTC).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Tokens understood by the filename generator.
pub const KNOWN_TOKENS: [&str; 9] = [
    "base",
    "base_clean",
    "ratio",
    "style",
    "w",
    "h",
    "date",
    "seq",
    "ext",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingMode {
    #[default]
    Auto,
    Custom,
}

/// Preset pattern choice, or a user template.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternChoice {
    #[default]
    BaseRatio,
    BaseRatioStyle,
    BaseDashRatio,
    BaseStyle,
    Custom,
}

impl PatternChoice {
    pub fn parse(key: &str) -> Option<Self> {
        match key.trim() {
            "base_ratio" => Some(Self::BaseRatio),
            "base_ratio_style" => Some(Self::BaseRatioStyle),
            "base_dash_ratio" => Some(Self::BaseDashRatio),
            "base_style" => Some(Self::BaseStyle),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    /// Preset template; `None` for [`PatternChoice::Custom`].
    pub fn preset(self) -> Option<&'static str> {
        match self {
            Self::BaseRatio => Some("{base_clean}_{ratio}"),
            Self::BaseRatioStyle => Some("{base_clean}__{ratio}__{style}"),
            Self::BaseDashRatio => Some("{base_clean}-{ratio}"),
            Self::BaseStyle => Some("{base_clean}__{style}"),
            Self::Custom => None,
        }
    }
}

/// The default preset pattern.
pub const DEFAULT_PATTERN: &str = "{base_clean}_{ratio}";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMode {
    /// `9x16`, `blur`.
    #[default]
    Short,
    /// `9:16 Portrait`, `Blurred background letterbox`.
    Friendly,
}

impl LabelMode {
    /// Accepts only `short` and `friendly`; anything else is `short`.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim() {
            "friendly" => Self::Friendly,
            _ => Self::Short,
        }
    }
}

/// Resolved filename-generation rules for one batch.
///
/// Invariant: `keep_tokens` implies `!auto_clean`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NamingPolicy {
    pub mode: NamingMode,
    pub pattern_choice: PatternChoice,
    pub pattern: String,
    #[serde(default)]
    pub custom_pattern: String,
    pub auto_clean: bool,
    pub keep_tokens: bool,
    pub add_sequence: bool,
    pub append_date: bool,
    pub label_mode: LabelMode,
    pub date_stamp: String,
}

impl NamingPolicy {
    /// The fixed policy used in auto mode.
    pub fn auto(date_stamp: impl Into<String>) -> Self {
        Self {
            mode: NamingMode::Auto,
            pattern_choice: PatternChoice::BaseRatio,
            pattern: DEFAULT_PATTERN.to_string(),
            custom_pattern: String::new(),
            auto_clean: true,
            keep_tokens: false,
            add_sequence: false,
            append_date: false,
            label_mode: LabelMode::Short,
            date_stamp: date_stamp.into(),
        }
    }

    /// Whether source names should have resolution/aspect tokens stripped.
    pub fn strips_tokens(&self) -> bool {
        self.auto_clean && !self.keep_tokens
    }

    /// Tokens referenced by the pattern that the generator does not know; they render empty.
    pub fn unknown_tokens(&self) -> Vec<String> {
        referenced_tokens(&self.pattern)
            .into_iter()
            .filter(|name| !KNOWN_TOKENS.contains(&name.as_str()))
            .collect()
    }
}

/// Raw naming fields as submitted by a caller (form fields, CLI flags).
///
/// Every field is optional; missing fields fall back to the prior batch policy, then to defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NamingForm {
    pub naming_mode: Option<String>,
    pub naming_preset: Option<String>,
    pub naming_custom_pattern: Option<String>,
    pub naming_auto_clean: Option<String>,
    pub naming_keep_tokens: Option<String>,
    pub naming_add_sequence: Option<String>,
    pub naming_append_date: Option<String>,
    pub naming_label_mode: Option<String>,
}

/// Permissive boolean parsing: `1`, `true`, `yes`, `y`, `on` (any case) are true, everything else
/// is false. `None` yields `default`.
pub fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value {
        None => default,
        Some(v) => matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "on"
        ),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Merge `form`, the `prior` policy of this batch (if any), and defaults into a policy.
///
/// `today` is used as the date stamp only when no prior policy fixed one.
pub fn build_naming_config(
    prior: Option<&NamingPolicy>,
    form: Option<&NamingForm>,
    today: &str,
) -> NamingPolicy {
    let form = form.cloned().unwrap_or_default();

    let mode = match non_empty(form.naming_mode.as_deref()) {
        Some("custom") => NamingMode::Custom,
        Some(_) => NamingMode::Auto,
        None => prior.map(|p| p.mode).unwrap_or_default(),
    };

    let date_stamp = prior
        .map(|p| p.date_stamp.as_str())
        .filter(|d| !d.is_empty())
        .unwrap_or(today)
        .to_string();

    if mode == NamingMode::Auto {
        return NamingPolicy::auto(date_stamp);
    }

    let pattern_choice = match non_empty(form.naming_preset.as_deref()) {
        Some(key) => PatternChoice::parse(key).unwrap_or_default(),
        None => prior.map(|p| p.pattern_choice).unwrap_or_default(),
    };

    let custom_pattern = non_empty(form.naming_custom_pattern.as_deref())
        .map(str::to_string)
        .or_else(|| prior.map(|p| p.custom_pattern.clone()))
        .unwrap_or_default()
        .trim()
        .to_string();

    let mut auto_clean = parse_bool(
        form.naming_auto_clean.as_deref(),
        prior.map(|p| p.auto_clean).unwrap_or(true),
    );
    let keep_tokens = parse_bool(
        form.naming_keep_tokens.as_deref(),
        prior.map(|p| p.keep_tokens).unwrap_or(false),
    );
    if keep_tokens {
        auto_clean = false;
    }

    let add_sequence = parse_bool(
        form.naming_add_sequence.as_deref(),
        prior.map(|p| p.add_sequence).unwrap_or(true),
    );
    let append_date = parse_bool(
        form.naming_append_date.as_deref(),
        prior.map(|p| p.append_date).unwrap_or(true),
    );

    let label_mode = match non_empty(form.naming_label_mode.as_deref()) {
        Some(value) => LabelMode::parse_lenient(value),
        None => prior.map(|p| p.label_mode).unwrap_or_default(),
    };

    let pattern = match pattern_choice.preset() {
        Some(preset) => preset.to_string(),
        None if !custom_pattern.is_empty() => custom_pattern.clone(),
        None => DEFAULT_PATTERN.to_string(),
    };

    let policy = NamingPolicy {
        mode,
        pattern_choice,
        pattern,
        custom_pattern,
        auto_clean,
        keep_tokens,
        add_sequence,
        append_date,
        label_mode,
        date_stamp,
    };
    let unknown = policy.unknown_tokens();
    if !unknown.is_empty() {
        tracing::warn!(?unknown, pattern = %policy.pattern, "pattern references unknown tokens; they render empty");
    }
    policy
}

/// Today's date stamp in UTC.
pub fn today_stamp() -> String {
    chrono::Utc::now().format(DATE_FORMAT).to_string()
}

#[cfg(test)]
#[path = "../../tests/unit/naming/policy.rs"]
mod tests;
