use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_to_gemini() {
    let cfg = LlmConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "secret")])).unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::Gemini);
    assert_eq!(cfg.model, "gemini-2.5-flash");
    assert_eq!(cfg.base_url, "https://generativelanguage.googleapis.com/v1beta");
    assert_eq!(cfg.max_tokens, DEFAULT_LLM_MAX_TOKENS);
    assert_eq!(
        cfg.timeouts,
        LlmTimeouts { request_secs: DEFAULT_LLM_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_LLM_CONNECT_TIMEOUT_SECS }
    );
    assert_eq!(cfg.api_key, "secret");
}

#[test]
fn parses_openai_overrides() {
    let cfg = LlmConfig::from_lookup(lookup_from(&[
        ("LLM_PROVIDER", "openai"),
        ("LLM_API_KEY_ENV", "MY_KEY"),
        ("MY_KEY", "sk-test"),
        ("LLM_MODEL", "gpt-4.1-mini"),
        ("LLM_BASE_URL", "https://example.test/v1/"),
        ("LLM_MAX_TOKENS", "1024"),
        ("LLM_REQUEST_TIMEOUT_SECS", "42"),
        ("LLM_CONNECT_TIMEOUT_SECS", "7"),
    ]))
    .unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::OpenAi);
    assert_eq!(cfg.api_key, "sk-test");
    assert_eq!(cfg.model, "gpt-4.1-mini");
    assert_eq!(cfg.base_url, "https://example.test/v1");
    assert_eq!(cfg.max_tokens, 1024);
    assert_eq!(cfg.timeouts, LlmTimeouts { request_secs: 42, connect_secs: 7 });
}

#[test]
fn anthropic_uses_its_default_key_var() {
    let cfg =
        LlmConfig::from_lookup(lookup_from(&[("LLM_PROVIDER", "anthropic"), ("ANTHROPIC_API_KEY", "k")])).unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::Anthropic);
    assert_eq!(cfg.model, "claude-sonnet-4-5-20250929");
    assert_eq!(cfg.base_url, "https://api.anthropic.com/v1");
}

#[test]
fn unknown_provider_errors() {
    let err = LlmConfig::from_lookup(lookup_from(&[("LLM_PROVIDER", "bad"), ("GEMINI_API_KEY", "k")]))
        .unwrap_err()
        .to_string();
    assert!(err.contains("unknown LLM_PROVIDER"));
}

#[test]
fn missing_key_names_the_variable() {
    let err = LlmConfig::from_lookup(lookup_from(&[])).unwrap_err();
    assert!(matches!(err, GatewayError::MissingApiKey { ref var } if var == "GEMINI_API_KEY"));
}

#[test]
fn blank_key_counts_as_missing() {
    let err = LlmConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "  ")])).unwrap_err();
    assert!(matches!(err, GatewayError::MissingApiKey { .. }));
}

#[test]
fn unparseable_numbers_fall_back() {
    let cfg = LlmConfig::from_lookup(lookup_from(&[
        ("GEMINI_API_KEY", "k"),
        ("LLM_MAX_TOKENS", "lots"),
        ("LLM_REQUEST_TIMEOUT_SECS", "-1"),
    ]))
    .unwrap();
    assert_eq!(cfg.max_tokens, DEFAULT_LLM_MAX_TOKENS);
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_LLM_REQUEST_TIMEOUT_SECS);
}

#[test]
fn debug_redacts_api_key() {
    let cfg = LlmConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "super-secret")])).unwrap();
    let debug = format!("{cfg:?}");
    assert!(!debug.contains("super-secret"));
    assert!(debug.contains("redacted"));
}
