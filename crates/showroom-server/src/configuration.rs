use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment};
use serde::Deserialize;
use showroom::providers::configs::{OpenAiProviderConfig, ProviderConfig};
use showroom::search::chroma::{ChromaConfig, DEFAULT_COLLECTION};
use std::net::SocketAddr;

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Failed to parse socket address")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum ProviderSettings {
    OpenAi {
        #[serde(default = "default_openai_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

impl ProviderSettings {
    /// The host and api key, shared with the embedding client.
    pub fn credentials(&self) -> (String, String) {
        match self {
            ProviderSettings::OpenAi { host, api_key, .. } => (host.clone(), api_key.clone()),
        }
    }

    // Convert to the showroom ProviderConfig
    pub fn into_config(self) -> ProviderConfig {
        match self {
            ProviderSettings::OpenAi {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
                timeout_secs,
            } => ProviderConfig::OpenAi(OpenAiProviderConfig {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
                timeout_secs,
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_search_host")]
    pub host: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            host: default_search_host(),
            collection: default_collection(),
            embedding_model: default_embedding_model(),
        }
    }
}

impl SearchSettings {
    pub fn into_config(self) -> ChromaConfig {
        ChromaConfig {
            host: self.host,
            collection: self.collection,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    #[serde(default)]
    pub search: SearchSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("SHOWROOM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        // Missing field errors are reported as the env var to set
        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches('`');
                    let env_var = to_env_var(field);
                    Err(ConfigError::MissingEnvVar { env_var })
                } else if let config::ConfigError::NotFound(field) = &err {
                    let env_var = to_env_var(field);
                    Err(ConfigError::MissingEnvVar { env_var })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_model() -> String {
    "gpt-4o-2024-08-06".to_string()
}

fn default_openai_host() -> String {
    "https://api.openai.com".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_search_host() -> String {
    "http://localhost:8000".to_string()
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("SHOWROOM_") {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();

        env::set_var("SHOWROOM_PROVIDER__TYPE", "openai");
        env::set_var("SHOWROOM_PROVIDER__API_KEY", "test-key");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.search.host, "http://localhost:8000");
        assert_eq!(settings.search.collection, "car-collection");

        let ProviderSettings::OpenAi {
            host,
            api_key,
            model,
            temperature,
            max_tokens,
            timeout_secs,
        } = settings.provider;
        assert_eq!(host, "https://api.openai.com");
        assert_eq!(api_key, "test-key");
        assert_eq!(model, "gpt-4o-2024-08-06");
        assert_eq!(temperature, None);
        assert_eq!(max_tokens, None);
        assert_eq!(timeout_secs, 60);

        env::remove_var("SHOWROOM_PROVIDER__TYPE");
        env::remove_var("SHOWROOM_PROVIDER__API_KEY");
    }

    #[test]
    #[serial]
    fn test_missing_api_key_names_env_var() {
        clean_env();

        env::set_var("SHOWROOM_PROVIDER__TYPE", "openai");

        let err = Settings::new().unwrap_err();
        match err {
            ConfigError::MissingEnvVar { env_var } => {
                assert!(env_var.starts_with("SHOWROOM_"));
            }
            other => panic!("expected MissingEnvVar, got {other:?}"),
        }

        env::remove_var("SHOWROOM_PROVIDER__TYPE");
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        env::set_var("SHOWROOM_SERVER__PORT", "8080");
        env::set_var("SHOWROOM_PROVIDER__TYPE", "openai");
        env::set_var("SHOWROOM_PROVIDER__API_KEY", "test-key");
        env::set_var("SHOWROOM_PROVIDER__MODEL", "gpt-4o-mini");
        env::set_var("SHOWROOM_PROVIDER__TEMPERATURE", "0.8");
        env::set_var("SHOWROOM_SEARCH__HOST", "http://chroma.internal:8000");
        env::set_var("SHOWROOM_SEARCH__COLLECTION", "demo-cars");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.search.host, "http://chroma.internal:8000");
        assert_eq!(settings.search.collection, "demo-cars");

        let ProviderSettings::OpenAi {
            model, temperature, ..
        } = settings.provider;
        assert_eq!(model, "gpt-4o-mini");
        assert_eq!(temperature, Some(0.8));

        env::remove_var("SHOWROOM_SERVER__PORT");
        env::remove_var("SHOWROOM_PROVIDER__TYPE");
        env::remove_var("SHOWROOM_PROVIDER__API_KEY");
        env::remove_var("SHOWROOM_PROVIDER__MODEL");
        env::remove_var("SHOWROOM_PROVIDER__TEMPERATURE");
        env::remove_var("SHOWROOM_SEARCH__HOST");
        env::remove_var("SHOWROOM_SEARCH__COLLECTION");
    }

    #[test]
    fn test_socket_addr_conversion() {
        let server_settings = ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 3000,
        };
        let addr = server_settings.socket_addr();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");
    }
}
