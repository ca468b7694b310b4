use super::*;

fn lookup(name: &str) -> Option<&'static str> {
    match name {
        "base" => Some("Beach"),
        "ratio" => Some("9x16"),
        "seq" => Some("007"),
        _ => None,
    }
}

#[test]
fn substitutes_known_tokens() {
    assert_eq!(render_pattern("{base}_{ratio}", lookup), "Beach_9x16");
    assert_eq!(render_pattern("{base}__{seq}", lookup), "Beach__007");
}

#[test]
fn unknown_tokens_become_empty() {
    assert_eq!(render_pattern("{base}_{nonexistent}", lookup), "Beach_");
    assert_eq!(render_pattern("{}{base}", lookup), "Beach");
}

#[test]
fn escaped_braces_are_literal() {
    assert_eq!(render_pattern("{{base}}_{ratio}", lookup), "{base}_9x16");
}

#[test]
fn format_spec_is_ignored() {
    assert_eq!(render_pattern("{ratio:>10}", lookup), "9x16");
}

#[test]
fn malformed_patterns_never_fail() {
    assert_eq!(render_pattern("{base", lookup), "");
    assert_eq!(render_pattern("x{base", lookup), "x");
    assert_eq!(render_pattern("a}b", lookup), "a}b");
    assert_eq!(render_pattern("", lookup), "");
}

#[test]
fn multibyte_text_survives() {
    assert_eq!(render_pattern("clé_{ratio}_ü", lookup), "clé_9x16_ü");
    assert_eq!(render_pattern("{bäse}{ratio}", lookup), "9x16");
}

#[test]
fn lists_referenced_tokens() {
    assert_eq!(
        referenced_tokens("{base_clean}__{ratio}__{{x}}_{seq:03}"),
        vec!["base_clean", "ratio", "seq"]
    );
    assert!(referenced_tokens("plain").is_empty());
}
