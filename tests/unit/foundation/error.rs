use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        AutoframeError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(AutoframeError::media("x").to_string().contains("media error:"));
    assert!(
        AutoframeError::from(serde_json::from_str::<u32>("x").unwrap_err())
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn clip_too_long_reports_both_durations() {
    let msg = AutoframeError::clip_too_long(181.25, 180).to_string();
    assert!(msg.contains("181.2") || msg.contains("181.3"));
    assert!(msg.contains("180s"));
}

#[test]
fn user_facing_kinds_are_distinct_from_processing_failures() {
    assert!(AutoframeError::clip_too_long(200.0, 180).is_user_facing());
    assert!(AutoframeError::MissingFilename.is_user_facing());
    assert!(!AutoframeError::media("encode failed").is_user_facing());
    assert!(!AutoframeError::validation("bad").is_user_facing());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = AutoframeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn serde_json_errors_convert() {
    let err: AutoframeError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, AutoframeError::Serde(_)));
}
