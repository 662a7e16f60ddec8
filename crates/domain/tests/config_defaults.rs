use xt_domain::config::{Config, ConfigSeverity};

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 3000);
}

#[test]
fn explicit_zero_host_parses() {
    let toml_str = r#"
[server]
host = "0.0.0.0"
port = 3100
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 3100);
}

#[test]
fn default_cors_allows_only_localhost() {
    let config = Config::default();
    assert!(config
        .server
        .cors
        .allowed_origins
        .contains(&"http://localhost:*".to_string()));
    assert!(config
        .server
        .cors
        .allowed_origins
        .contains(&"http://127.0.0.1:*".to_string()));
}

#[test]
fn default_cache_ttl_is_five_minutes() {
    let config = Config::default();
    assert_eq!(config.context.ttl_secs, 300);
    assert_eq!(config.context.default_turns, 10);
    assert_eq!(config.context.max_turns, 99);
}

#[test]
fn default_config_validates_without_errors() {
    let config = Config::default();
    let issues = config.validate();
    assert!(issues
        .iter()
        .all(|i| i.severity != ConfigSeverity::Error));
}

#[test]
fn out_of_range_budget_is_rejected() {
    let toml_str = r#"
[context]
max_turns = 200
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    assert!(issues.iter().any(|i| {
        i.severity == ConfigSeverity::Error && i.field == "context.max_turns"
    }));
}

#[test]
fn default_budget_above_max_is_rejected() {
    let toml_str = r#"
[context]
default_turns = 50
max_turns = 20
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    assert!(issues.iter().any(|i| i.field == "context.default_turns"));
}

#[test]
fn provider_without_base_url_is_an_error() {
    let toml_str = r#"
[[llm.providers]]
id = "openai"
base_url = ""
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    assert!(issues.iter().any(|i| {
        i.severity == ConfigSeverity::Error && i.field.contains("base_url")
    }));
}

#[test]
fn default_store_path() {
    let config = Config::default();
    assert_eq!(
        config.store.path,
        std::path::PathBuf::from("data/transcripts")
    );
}
