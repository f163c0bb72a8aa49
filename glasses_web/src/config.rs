use glasses_prediction::{
    config::{current_environment, deserialize_log_level, load_layered, LogLevel, ModelConfig},
    Locale,
};
use serde::Deserialize;

const ENV_PREFIX: &str = "GW";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    #[serde(default)]
    pub locale: Locale,
    pub models: ModelConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

impl ServerConfig {
    pub fn get_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn get_configuration() -> Result<Config, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("no current directory: {}", e)))?;
    let environment = current_environment()?;

    let config: Config = load_layered(&base_path.join("configuration"), &environment, ENV_PREFIX)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glasses_prediction::config::Environment;
    use std::{fs, path::Path, path::PathBuf};

    const BASE_YAML: &str = include_str!("../../configuration/base.yaml");
    const LOCAL_YAML: &str = include_str!("../../configuration/local.yaml");
    const PRODUCTION_YAML: &str = include_str!("../../configuration/production.yaml");

    fn shipped_configuration(dir: &Path) {
        fs::write(dir.join("base.yaml"), BASE_YAML).unwrap();
        fs::write(dir.join("local.yaml"), LOCAL_YAML).unwrap();
        fs::write(dir.join("production.yaml"), PRODUCTION_YAML).unwrap();
    }

    #[test]
    fn test_shipped_local_configuration() {
        let dir = tempfile::tempdir().unwrap();
        shipped_configuration(dir.path());

        let config: Config =
            load_layered(dir.path(), &Environment::Local, "GW_TEST_LOCAL").unwrap();

        assert_eq!(config.server.get_address(), "127.0.0.1:8080");
        assert_eq!(config.server.max_upload_bytes, default_max_upload_bytes());
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.locale, Locale::English);
        assert_eq!(
            config.models.vgg19_path(),
            PathBuf::from("models/vgg19_glasses.onnx")
        );
        assert_eq!(
            config.models.vgg16_path(),
            PathBuf::from("models/vgg16_glasses.onnx")
        );
    }

    #[test]
    fn test_shipped_production_configuration() {
        let dir = tempfile::tempdir().unwrap();
        shipped_configuration(dir.path());

        let config: Config =
            load_layered(dir.path(), &Environment::Production, "GW_TEST_PRODUCTION").unwrap();

        assert_eq!(config.server.get_address(), "0.0.0.0:8080");
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.models.intra_threads, 4);
    }

    #[test]
    fn test_environment_variables_override_files() {
        let dir = tempfile::tempdir().unwrap();
        shipped_configuration(dir.path());
        std::env::set_var("GWOVERRIDETEST_SERVER__PORT", "9090");
        std::env::set_var("GWOVERRIDETEST_LOCALE", "id");

        let config: Config =
            load_layered(dir.path(), &Environment::Local, "GWOVERRIDETEST").unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.locale, Locale::Indonesian);
    }

    #[test]
    fn test_missing_server_block_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("base.yaml"),
            "log_level: info\nmodels:\n  model_dir: m\n  vgg19_file: a.onnx\n  vgg16_file: b.onnx\n",
        )
        .unwrap();

        let result: Result<Config, _> =
            load_layered(dir.path(), &Environment::Local, "GW_TEST_MISSING");

        assert!(result.is_err());
    }

    #[test]
    fn test_get_address() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_upload_bytes: default_max_upload_bytes(),
        };

        assert_eq!(server.get_address(), "127.0.0.1:8080");
    }
}
