use serde::{Deserialize, Serialize};

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub url: String,
}

/// Auth configuration.
///
/// The signing secret is required: there is deliberately no fallback default,
/// so a deployment without a secret fails at startup instead of signing
/// tokens with a well-known value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// Server configuration - loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub listen: String, // "0.0.0.0:8080"
    pub db: DbConfig,
    pub auth: AuthConfig,
}

/// Load server config from a YAML file with VAKT__ env var overrides.
pub fn load_config(path: &str) -> anyhow::Result<ServerConfig> {
    use anyhow::Context;
    let config: ServerConfig = config::Config::builder()
        .add_source(config::File::new(path, config::FileFormat::Yaml))
        .add_source(
            config::Environment::with_prefix("VAKT")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .with_context(|| format!("Failed to build config from: {}", path))?
        .try_deserialize()
        .with_context(|| format!("Failed to deserialize config from: {}", path))?;
    if config.auth.jwt_secret.is_empty() {
        anyhow::bail!("auth.jwt_secret must not be empty");
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
listen: "0.0.0.0:8080"
db:
  url: "sqlite://vakt.db"
auth:
  jwt_secret: "my-jwt-secret"
"#;
        let config: ServerConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.listen, "0.0.0.0:8080");
        assert_eq!(config.db.url, "sqlite://vakt.db");
        assert_eq!(config.auth.jwt_secret, "my-jwt-secret");
    }

    #[test]
    fn test_parse_missing_jwt_secret_fails() {
        let yaml = r#"
listen: "0.0.0.0:8080"
db:
  url: "sqlite://vakt.db"
auth: {}
"#;
        let result = serde_yml::from_str::<ServerConfig>(yaml);
        assert!(result.is_err(), "Config without jwt_secret should fail");
    }

    #[test]
    fn test_parse_missing_auth_section_fails() {
        let yaml = r#"
listen: "0.0.0.0:8080"
db:
  url: "sqlite://vakt.db"
"#;
        let result = serde_yml::from_str::<ServerConfig>(yaml);
        assert!(result.is_err(), "Config without auth section should fail");
    }

    #[test]
    fn test_parse_missing_db_url_fails() {
        let yaml = r#"
listen: "0.0.0.0:8080"
auth:
  jwt_secret: "secret"
"#;
        let result = serde_yml::from_str::<ServerConfig>(yaml);
        assert!(result.is_err(), "Config without db section should fail");
    }

    #[test]
    fn test_load_config_empty_jwt_secret_fails() {
        let yaml = r#"
listen: "0.0.0.0:8080"
db:
  url: "sqlite://vakt.db"
auth:
  jwt_secret: ""
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, yaml.as_bytes()).unwrap();
        std::io::Write::flush(&mut file).unwrap();

        let result = load_config(file.path().to_str().unwrap());
        assert!(result.is_err(), "Empty jwt_secret should fail startup");
    }

    /// Serialize access to env vars in tests to avoid races between parallel tests
    static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn test_env_override_jwt_secret() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let yaml = r#"
listen: "0.0.0.0:8080"
db:
  url: "sqlite://vakt.db"
auth:
  jwt_secret: "yaml-secret"
"#;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, yaml.as_bytes()).unwrap();
        std::io::Write::flush(&mut file).unwrap();

        // SAFETY: test-only, serialized by ENV_MUTEX
        unsafe {
            std::env::set_var("VAKT__AUTH__JWT_SECRET", "env-secret");
        }

        let config = load_config(file.path().to_str().unwrap()).unwrap();

        unsafe {
            std::env::remove_var("VAKT__AUTH__JWT_SECRET");
        }

        assert_eq!(config.auth.jwt_secret, "env-secret");
        // Non-overridden values preserved from YAML
        assert_eq!(config.listen, "0.0.0.0:8080");
        assert_eq!(config.db.url, "sqlite://vakt.db");
    }
}
