use super::*;

fn custom_form() -> NamingForm {
    NamingForm {
        naming_mode: Some("custom".to_string()),
        ..NamingForm::default()
    }
}

#[test]
fn auto_mode_is_fixed() {
    let policy = build_naming_config(None, None, "2026-01-02");
    assert_eq!(policy, NamingPolicy::auto("2026-01-02"));
    assert_eq!(policy.pattern, "{base_clean}_{ratio}");
    assert!(policy.auto_clean);
    assert!(!policy.add_sequence);
    assert!(!policy.append_date);
}

#[test]
fn auto_mode_ignores_custom_fields() {
    let form = NamingForm {
        naming_mode: Some("auto".to_string()),
        naming_preset: Some("base_style".to_string()),
        naming_add_sequence: Some("yes".to_string()),
        ..NamingForm::default()
    };
    let policy = build_naming_config(None, Some(&form), "2026-01-02");
    assert_eq!(policy, NamingPolicy::auto("2026-01-02"));
}

#[test]
fn prior_date_stamp_wins_over_today() {
    let prior = NamingPolicy::auto("2025-12-31");
    let policy = build_naming_config(Some(&prior), None, "2026-01-02");
    assert_eq!(policy.date_stamp, "2025-12-31");
}

#[test]
fn resolution_is_idempotent() {
    let form = NamingForm {
        naming_preset: Some("base_ratio_style".to_string()),
        naming_append_date: Some("0".to_string()),
        ..custom_form()
    };
    let a = build_naming_config(None, Some(&form), "2026-03-04");
    let b = build_naming_config(None, Some(&form), "2026-03-04");
    assert_eq!(a, b);

    // Feeding the resolved policy back as prior state keeps it unchanged.
    let c = build_naming_config(Some(&a), Some(&form), "2027-01-01");
    assert_eq!(a, c);
}

#[test]
fn custom_defaults_enable_sequence_and_date() {
    let policy = build_naming_config(None, Some(&custom_form()), "2026-01-02");
    assert_eq!(policy.mode, NamingMode::Custom);
    assert_eq!(policy.pattern_choice, PatternChoice::BaseRatio);
    assert_eq!(policy.pattern, DEFAULT_PATTERN);
    assert!(policy.auto_clean);
    assert!(!policy.keep_tokens);
    assert!(policy.add_sequence);
    assert!(policy.append_date);
    assert_eq!(policy.label_mode, LabelMode::Short);
}

#[test]
fn keep_tokens_forces_auto_clean_off() {
    let form = NamingForm {
        naming_auto_clean: Some("true".to_string()),
        naming_keep_tokens: Some("ON".to_string()),
        ..custom_form()
    };
    let policy = build_naming_config(None, Some(&form), "2026-01-02");
    assert!(policy.keep_tokens);
    assert!(!policy.auto_clean);
    assert!(!policy.strips_tokens());
}

#[test]
fn presets_map_to_patterns() {
    for (key, pattern) in [
        ("base_ratio", "{base_clean}_{ratio}"),
        ("base_ratio_style", "{base_clean}__{ratio}__{style}"),
        ("base_dash_ratio", "{base_clean}-{ratio}"),
        ("base_style", "{base_clean}__{style}"),
        ("nonsense", "{base_clean}_{ratio}"),
    ] {
        let form = NamingForm {
            naming_preset: Some(key.to_string()),
            ..custom_form()
        };
        assert_eq!(build_naming_config(None, Some(&form), "d").pattern, pattern);
    }
}

#[test]
fn custom_pattern_used_and_blank_falls_back() {
    let form = NamingForm {
        naming_preset: Some("custom".to_string()),
        naming_custom_pattern: Some("  {date}-{base}-{w}x{h}  ".to_string()),
        ..custom_form()
    };
    let policy = build_naming_config(None, Some(&form), "d");
    assert_eq!(policy.pattern_choice, PatternChoice::Custom);
    assert_eq!(policy.pattern, "{date}-{base}-{w}x{h}");

    let blank = NamingForm {
        naming_preset: Some("custom".to_string()),
        naming_custom_pattern: Some("   ".to_string()),
        ..custom_form()
    };
    let policy = build_naming_config(None, Some(&blank), "d");
    assert_eq!(policy.pattern, DEFAULT_PATTERN);
}

#[test]
fn label_mode_coerces_unknown_values() {
    let form = NamingForm {
        naming_label_mode: Some("fancy".to_string()),
        ..custom_form()
    };
    assert_eq!(
        build_naming_config(None, Some(&form), "d").label_mode,
        LabelMode::Short
    );
    let form = NamingForm {
        naming_label_mode: Some("friendly".to_string()),
        ..custom_form()
    };
    assert_eq!(
        build_naming_config(None, Some(&form), "d").label_mode,
        LabelMode::Friendly
    );
}

#[test]
fn missing_fields_inherit_prior_custom_policy() {
    let first = build_naming_config(
        None,
        Some(&NamingForm {
            naming_preset: Some("base_style".to_string()),
            naming_add_sequence: Some("no".to_string()),
            naming_label_mode: Some("friendly".to_string()),
            ..custom_form()
        }),
        "2026-05-06",
    );
    let second = build_naming_config(Some(&first), Some(&NamingForm::default()), "2026-05-07");
    assert_eq!(second, first);
}

#[test]
fn parse_bool_spellings() {
    for v in ["1", "true", "TRUE", "yes", "Y", "on", " On "] {
        assert!(parse_bool(Some(v), false), "{v}");
    }
    for v in ["0", "false", "no", "off", "", "maybe"] {
        assert!(!parse_bool(Some(v), true), "{v}");
    }
    assert!(parse_bool(None, true));
    assert!(!parse_bool(None, false));
}

#[test]
fn unknown_tokens_are_reported() {
    let mut policy = NamingPolicy::auto("d");
    policy.pattern = "{base}_{nonexistent}_{seq}".to_string();
    assert_eq!(policy.unknown_tokens(), vec!["nonexistent".to_string()]);
}

#[test]
fn policy_serializes_with_snake_case_keys() {
    let json = serde_json::to_value(NamingPolicy::auto("2026-01-02")).unwrap();
    assert_eq!(json["mode"], "auto");
    assert_eq!(json["pattern_choice"], "base_ratio");
    assert_eq!(json["label_mode"], "short");
    assert_eq!(json["date_stamp"], "2026-01-02");
}
