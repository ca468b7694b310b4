use super::*;
use crate::naming::policy::{NamingForm, build_naming_config};

fn custom_policy(pattern_choice: &str, custom: Option<&str>) -> NamingPolicy {
    let form = NamingForm {
        naming_mode: Some("custom".to_string()),
        naming_preset: Some(pattern_choice.to_string()),
        naming_custom_pattern: custom.map(str::to_string),
        ..NamingForm::default()
    };
    build_naming_config(None, Some(&form), "2026-02-03")
}

#[test]
fn base_info_strips_tokens_under_auto_policy() {
    let policy = NamingPolicy::auto("2026-02-03");
    let info = prepare_base_info("Beach Day 1080x1920.mp4", None, &policy);
    assert_eq!(info.base, "Beach_Day_1080x1920");
    assert_eq!(info.base_clean, "Beach_Day");
    assert_eq!(info.original_filename, "Beach Day 1080x1920.mp4");
}

#[test]
fn base_info_keeps_tokens_when_requested() {
    let mut policy = NamingPolicy::auto("d");
    policy.keep_tokens = true;
    policy.auto_clean = false;
    let info = prepare_base_info("Beach_16x9.mov", None, &policy);
    assert_eq!(info.base_clean, "Beach_16x9");
}

#[test]
fn override_name_replaces_source_stem() {
    let policy = NamingPolicy::auto("d");
    let info = prepare_base_info("IMG_0001.MOV", Some("  Launch Teaser  "), &policy);
    assert_eq!(info.base, "Launch_Teaser");
    assert_eq!(info.original_filename, "IMG_0001.MOV");

    let blank = prepare_base_info("IMG_0001.MOV", Some("   "), &policy);
    assert_eq!(blank.base, "IMG_0001");
}

#[test]
fn auto_policy_names_are_clean_stem_and_ratio() {
    let dir = tempfile::tempdir().unwrap();
    let policy = NamingPolicy::auto("2026-02-03");
    let info = prepare_base_info("Beach_1920x1080.mp4", None, &policy);

    let portrait = generate_output_filename(
        &info,
        AspectKey::Portrait,
        StyleKind::Fill,
        &policy,
        Some(1),
        "mp4",
        dir.path(),
    );
    assert_eq!(portrait.filename, "Beach_9x16.mp4");
    assert_eq!(portrait.ratio_token(), "9x16");

    let square = generate_output_filename(
        &info,
        AspectKey::Square,
        StyleKind::Fill,
        &policy,
        Some(2),
        "mp4",
        dir.path(),
    );
    assert_eq!(square.filename, "Beach_1x1.mp4");
}

#[test]
fn sequence_and_date_are_appended_when_pattern_lacks_them() {
    let dir = tempfile::tempdir().unwrap();
    let policy = custom_policy("base_ratio_style", None);
    let info = prepare_base_info("Beach.mp4", None, &policy);
    let name = generate_output_filename(
        &info,
        AspectKey::FourFive,
        StyleKind::Blur,
        &policy,
        Some(7),
        "mp4",
        dir.path(),
    );
    assert_eq!(name.filename, "Beach__4x5__blur__007__2026-02-03.mp4");
}

#[test]
fn explicit_seq_and_date_tokens_are_not_duplicated() {
    let dir = tempfile::tempdir().unwrap();
    let policy = custom_policy("custom", Some("{DATE}_{base_clean}_{seq}_{ratio}"));
    let info = prepare_base_info("Beach.mp4", None, &policy);
    let name = generate_output_filename(
        &info,
        AspectKey::Landscape,
        StyleKind::Black,
        &policy,
        Some(3),
        "mp4",
        dir.path(),
    );
    // `{DATE}` is not a known token (tokens are case-sensitive) but the lowercase check still
    // suppresses the appended date.
    assert_eq!(name.filename, "Beach_003_16x9.mp4");
}

#[test]
fn missing_sequence_leaves_no_trace() {
    let dir = tempfile::tempdir().unwrap();
    let policy = custom_policy("base_ratio", None);
    let info = prepare_base_info("Beach.mp4", None, &policy);
    let name = generate_output_filename(
        &info,
        AspectKey::Square,
        StyleKind::Blur,
        &policy,
        None,
        "mp4",
        dir.path(),
    );
    assert_eq!(name.filename, "Beach_1x1__2026-02-03.mp4");
    assert_eq!(name.tokens.seq, "");
}

#[test]
fn unknown_tokens_render_empty() {
    let dir = tempfile::tempdir().unwrap();
    let policy = custom_policy("custom", Some("{base_clean}_{nonexistent}_{ratio}"));
    let info = prepare_base_info("Beach.mp4", None, &policy);
    let name = generate_output_filename(
        &info,
        AspectKey::Square,
        StyleKind::Blur,
        &policy,
        None,
        "mp4",
        dir.path(),
    );
    assert!(name.filename.starts_with("Beach__1x1"));
    assert!(!name.filename.contains("nonexistent"));
}

#[test]
fn empty_render_falls_back_to_clean_stem_and_ratio() {
    let dir = tempfile::tempdir().unwrap();
    let mut policy = custom_policy("custom", Some("{nothing}__--"));
    policy.add_sequence = false;
    policy.append_date = false;
    let info = prepare_base_info("Beach.mp4", None, &policy);
    let name = generate_output_filename(
        &info,
        AspectKey::Portrait,
        StyleKind::Blur,
        &policy,
        None,
        "mp4",
        dir.path(),
    );
    assert_eq!(name.filename, "Beach_9x16.mp4");
}

#[test]
fn friendly_labels_and_dimension_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let form = NamingForm {
        naming_mode: Some("custom".to_string()),
        naming_preset: Some("custom".to_string()),
        naming_custom_pattern: Some("{base}-{w}x{h}-{ratio}-{style}.{ext}".to_string()),
        naming_label_mode: Some("friendly".to_string()),
        naming_add_sequence: Some("0".to_string()),
        naming_append_date: Some("0".to_string()),
        ..NamingForm::default()
    };
    let policy = build_naming_config(None, Some(&form), "d");
    let info = prepare_base_info("Beach.mp4", None, &policy);
    let name = generate_output_filename(
        &info,
        AspectKey::Portrait,
        StyleKind::Fill,
        &policy,
        None,
        "mp4",
        dir.path(),
    );
    assert_eq!(name.tokens.ratio, "9:16 Portrait");
    assert_eq!(name.tokens.style, "Fill & crop");
    assert_eq!(name.filename, "Beach-1080x1920-9_16_Portrait-Fill_crop.mp4");
}

#[test]
fn collisions_get_counter_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let policy = NamingPolicy::auto("d");
    let info = prepare_base_info("Beach.mp4", None, &policy);
    let first = generate_output_filename(
        &info,
        AspectKey::Square,
        StyleKind::Blur,
        &policy,
        None,
        "mp4",
        dir.path(),
    );
    std::fs::write(dir.path().join(&first.filename), b"x").unwrap();
    let second = generate_output_filename(
        &info,
        AspectKey::Square,
        StyleKind::Blur,
        &policy,
        None,
        "mp4",
        dir.path(),
    );
    assert_eq!(second.filename, "Beach_1x1__001.mp4");
}
