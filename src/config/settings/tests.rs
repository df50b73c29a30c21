use super::*;
use tempfile::TempDir;

#[test]
fn defaults_when_no_config_file_exists() {
    let dir = TempDir::new().expect("temp dir");
    let config = Config::load(dir.path()).expect("load should succeed");

    assert_eq!(config.ollama, OllamaConfig::default());
    assert_eq!(config.chunking.max_chunk_size, 1000);
    assert_eq!(config.chunking.overlap_size, 200);
    assert_eq!(config.server.port, 5000);
    assert_eq!(config.base_dir, dir.path());
}

#[test]
fn save_and_reload_round_trip() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = Config::load(dir.path()).expect("load should succeed");
    config.ollama.chat_model = "llama3.2:3b".to_string();
    config.server.port = 8080;
    config.save().expect("save should succeed");

    let reloaded = Config::load(dir.path()).expect("reload should succeed");
    assert_eq!(reloaded.ollama.chat_model, "llama3.2:3b");
    assert_eq!(reloaded.server.port, 8080);
}

#[test]
fn partial_config_file_fills_in_defaults() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join("config.toml"),
        "[ollama]\nchat_model = \"mistral:latest\"\n",
    )
    .expect("write config");

    let config = Config::load(dir.path()).expect("load should succeed");
    assert_eq!(config.ollama.chat_model, "mistral:latest");
    assert_eq!(config.ollama.embedding_model, "all-minilm:latest");
    assert_eq!(config.chunking.max_chunk_size, 1000);
}

#[test]
fn invalid_overlap_is_rejected_at_load() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join("config.toml"),
        "[chunking]\nmax_chunk_size = 100\noverlap_size = 100\n",
    )
    .expect("write config");

    assert!(Config::load(dir.path()).is_err());
}

#[test]
fn ollama_validation_bounds() {
    let mut ollama = OllamaConfig::default();
    assert!(ollama.validate().is_ok());

    ollama.protocol = "ftp".to_string();
    assert!(matches!(
        ollama.validate(),
        Err(ConfigError::InvalidProtocol(_))
    ));

    ollama = OllamaConfig::default();
    ollama.batch_size = 0;
    assert!(matches!(
        ollama.validate(),
        Err(ConfigError::InvalidBatchSize(0))
    ));

    ollama = OllamaConfig::default();
    ollama.embedding_dimension = 10;
    assert!(matches!(
        ollama.validate(),
        Err(ConfigError::InvalidEmbeddingDimension(10))
    ));

    ollama = OllamaConfig::default();
    ollama.chat_model = "  ".to_string();
    assert!(matches!(ollama.validate(), Err(ConfigError::InvalidModel(_))));
}

#[test]
fn grants_file_path_defaults_into_data_dir() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = Config::load(dir.path()).expect("load should succeed");
    assert_eq!(config.grants_file_path(), dir.path().join("grants.json"));

    config.grants_file = Some("/data/grants-export.json".into());
    assert_eq!(
        config.grants_file_path(),
        std::path::PathBuf::from("/data/grants-export.json")
    );
}

#[test]
fn ollama_url_formats_host_and_port() {
    let ollama = OllamaConfig::default();
    let url = ollama.ollama_url().expect("url should build");
    assert_eq!(url.as_str(), "http://localhost:11434/");
}
