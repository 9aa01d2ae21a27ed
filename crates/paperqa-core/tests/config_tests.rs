use figment::Jail;
use paperqa_core::config::{expand_path, resolve_with_base, AppConfig, EmbeddingProvider};
use std::path::Path;

#[test]
fn defaults_apply_without_any_config_file() {
    Jail::expect_with(|jail| {
        jail.set_env("RUST_ENV", "test");
        let config = AppConfig::load().expect("load");
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.retrieval.k, 4);
        assert!(config.llm.temperature.abs() < f32::EPSILON);
        assert_eq!(config.embedding.provider, EmbeddingProvider::Remote);
        assert_eq!(config.embedding.timeout_secs, 120);
        assert!(config.pdf_dir().ends_with("papers"));
        Ok(())
    });
}

#[test]
fn env_overlay_and_app_vars_layer_over_config_toml() {
    Jail::expect_with(|jail| {
        jail.set_env("RUST_ENV", "test");
        jail.create_file(
            "config.toml",
            r#"
            [data]
            pdf_dir = "corpus"
            index_dir = "idx"

            [retrieval]
            k = 6

            [llm]
            model = "base-model"
            "#,
        )?;
        jail.create_file(
            "config.test.toml",
            r#"
            [embedding]
            provider = "fake"
            dim = 32
            timeout_secs = 15
            "#,
        )?;
        jail.set_env("APP_LLM__MODEL", "override-model");
        jail.set_env("OPENAI_API_KEY", "sk-from-env");

        let config = AppConfig::load().expect("load");
        assert_eq!(config.retrieval.k, 6);
        assert_eq!(config.embedding.provider, EmbeddingProvider::Fake);
        assert_eq!(config.embedding.dim, 32);
        assert_eq!(config.embedding.timeout_secs, 15);
        assert_eq!(config.llm.model, "override-model");
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-from-env"));
        assert_eq!(config.embedding.api_key.as_deref(), Some("sk-from-env"));
        assert!(config.pdf_dir().ends_with("corpus"));
        assert!(config.index_dir().ends_with("idx"));
        Ok(())
    });
}

#[test]
fn explicit_key_wins_over_env_fallback() {
    Jail::expect_with(|jail| {
        jail.set_env("RUST_ENV", "test");
        jail.set_env("OPENAI_API_KEY", "sk-fallback");
        jail.set_env("APP_LLM__API_KEY", "sk-explicit");
        let config = AppConfig::load().expect("load");
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-explicit"));
        assert_eq!(config.embedding.api_key.as_deref(), Some("sk-explicit"));
        Ok(())
    });
}

#[test]
fn invalid_chunking_is_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("RUST_ENV", "test");
        jail.create_file("config.toml", "[chunking]\nchunk_size = 100\nchunk_overlap = 300\n")?;
        assert!(AppConfig::load().is_err());
        Ok(())
    });
}

#[test]
fn relative_paths_resolve_against_base() {
    let base = Path::new("/srv/app");
    assert_eq!(resolve_with_base(base, "papers"), Path::new("/srv/app/papers"));
    assert_eq!(resolve_with_base(base, "/abs/papers"), Path::new("/abs/papers"));
    assert_eq!(expand_path("plain/dir"), Path::new("plain/dir"));
}
