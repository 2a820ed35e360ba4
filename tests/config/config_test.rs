//! Coverage for config parsing, env overrides and validation.

use std::collections::HashMap;
use std::path::Path;

use quill::config::{
    load_config, load_or_default, resolve_config_path, Config, ConfigError, CONFIG_FILE_NAME,
};
use quill::normalizer::TerminalMark;
use quill::persona::PostMode;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn empty_file_yields_defaults() {
    let config = Config::from_toml("").expect("empty config should parse");
    assert_eq!(config.models.default, "ollama/llama3.2");
    assert_eq!(config.generation.max_attempts, 5);
    assert_eq!(config.generation.max_tokens, 160);
    assert!(config.persona.path.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn parses_partial_sections() {
    let config = Config::from_toml(
        r#"
[models]
default = "openai/gpt-4o-mini"

[generation]
max_attempts = 3
terminal_mark = "period"
mode = "summary"

[style]
hashtag_margin = 30

[persona]
path = "/etc/quill/persona.toml"
"#,
    )
    .expect("config should parse");

    assert_eq!(config.models.default, "openai/gpt-4o-mini");
    assert_eq!(config.models.ollama_url, "http://127.0.0.1:11434");
    assert_eq!(config.generation.max_attempts, 3);
    assert_eq!(config.generation.history_capacity, 10);
    assert_eq!(config.generation.terminal_mark, TerminalMark::Period);
    assert_eq!(config.generation.mode, PostMode::Summary);
    assert_eq!(config.style.hashtag_margin, 30);
    assert_eq!(config.style.emoji_margin, 4);
    assert_eq!(
        config.persona.path.as_deref(),
        Some(Path::new("/etc/quill/persona.toml"))
    );
}

#[test]
fn env_overrides_file_values() {
    let mut config = Config::from_toml("[generation]\nmax_attempts = 2\n").expect("parse");
    config.apply_overrides(env_from(&[
        ("QUILL_MODEL", "ollama/qwen3:8b"),
        ("QUILL_OLLAMA_URL", "http://gpu-box:11434"),
        ("QUILL_MAX_ATTEMPTS", "7"),
        ("QUILL_TIMEOUT_SECS", "30"),
        ("QUILL_MODE", "Summary"),
    ]));

    assert_eq!(config.models.default, "ollama/qwen3:8b");
    assert_eq!(config.models.ollama_url, "http://gpu-box:11434");
    assert_eq!(config.generation.max_attempts, 7);
    assert_eq!(config.generation.timeout_secs, 30);
    assert_eq!(config.generation.mode, PostMode::Summary);
}

#[test]
fn invalid_env_values_are_ignored() {
    let mut config = Config::default();
    config.apply_overrides(env_from(&[
        ("QUILL_MAX_ATTEMPTS", "lots"),
        ("QUILL_TIMEOUT_SECS", "-1"),
        ("QUILL_MODE", "thread"),
    ]));
    assert_eq!(config.generation.max_attempts, 5);
    assert_eq!(config.generation.timeout_secs, 90);
    assert_eq!(config.generation.mode, PostMode::Standard);
}

#[test]
fn validate_rejects_zero_attempts_and_history() {
    let mut config = Config::default();
    config.generation.max_attempts = 0;
    assert!(matches!(config.validate(), Err(ConfigError::ZeroAttempts)));

    let mut config = Config::default();
    config.generation.history_capacity = 0;
    assert!(matches!(config.validate(), Err(ConfigError::ZeroHistory)));
}

#[test]
fn validate_rejects_unordered_thresholds() {
    let mut config = Config::default();
    config.style.emoji_prefix_below = 0.8;
    config.style.emoji_suffix_below = 0.5;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Thresholds { .. })
    ));

    config.style.emoji_prefix_below = 0.0;
    config.style.emoji_suffix_below = 1.5;
    assert!(config.validate().is_err());
}

#[test]
fn load_or_default_handles_missing_file() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let config = load_or_default(&tmp.path().join(CONFIG_FILE_NAME), env_from(&[]))
        .expect("missing file means defaults");
    assert_eq!(config.generation.max_attempts, 5);
}

#[test]
fn load_or_default_validates_after_overrides() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let path = tmp.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "[generation]\nmax_attempts = 4\n").expect("write config");

    let config = load_or_default(&path, env_from(&[])).expect("valid config");
    assert_eq!(config.generation.max_attempts, 4);

    let result = load_or_default(&path, env_from(&[("QUILL_MAX_ATTEMPTS", "0")]));
    assert!(result.is_err());
}

#[test]
fn load_config_reports_bad_toml() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let path = tmp.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "[generation\nmax_attempts = ").expect("write config");
    assert!(load_config(&path).is_err());
    assert!(load_config(&tmp.path().join("absent.toml")).is_err());
}

#[test]
fn config_path_precedence() {
    let explicit = Path::new("/tmp/explicit.toml");
    let env = env_from(&[("QUILL_CONFIG_PATH", "/tmp/from-env.toml")]);

    let path = resolve_config_path(Some(explicit), &env).expect("explicit path");
    assert_eq!(path, explicit);

    let path = resolve_config_path(None, &env).expect("env path");
    assert_eq!(path, Path::new("/tmp/from-env.toml"));

    let path = resolve_config_path(None, env_from(&[])).expect("default path");
    assert!(path.ends_with(".quill/quill.toml"));
}
