use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use crate::gate::{GateConfig, RouteDescriptor};
use crate::sources::SourceConfig;

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

fn default_sign_in_route() -> String {
    "/sign-in".to_string()
}

fn default_initial_route() -> String {
    "/".to_string()
}

/// Main config for v1.0.0: backend location, auth source, gate bounds,
/// route table, logging.
#[derive(Deserialize, Serialize, Debug, JsonSchema)]
pub struct ConfigV1 {
    /// Base URI of the record-management backend.
    pub backend_uri: String,
    #[serde(default = "default_sign_in_route")]
    pub sign_in_route: String,
    /// Route the client navigates to on startup.
    #[serde(default = "default_initial_route")]
    pub initial_route: String,
    pub source: SourceConfig,
    #[serde(default)]
    pub gate: GateConfig,
    pub routes: Vec<RouteDescriptor>,
    pub logging: LoggingConfig,
}

/// Load config from "config.yaml" in the current directory, with
/// VAULT_-prefixed environment variables taking precedence.
pub fn load_config() -> ConfigV1 {
    let figment = Figment::new()
        .merge(Yaml::file("./config.yaml"))
        .merge(Env::prefixed("VAULT_"));
    let config = match figment.extract::<Config>() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    };
    match config {
        Config::ConfigV1(c) => c,
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema).unwrap());
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_CONFIG: &str = r#"
version: "1.0.0"
backend_uri: "http://127.0.0.1:8000"
source:
  type: "plain"
  name: "Plain source"
  email: adam@example.com
  token: tok_123
routes:
  - path: "/"
    name: home
    public: true
  - path: "/profile"
    name: profile
logging:
  level: "debug"
  format: "console"
"#;

    /// A minimal YAML config parses with the documented defaults applied.
    #[test]
    fn test_config_defaults() {
        let config: Config = Figment::new()
            .merge(Yaml::string(TEST_CONFIG))
            .extract()
            .expect("Failed to parse test config YAML");
        let Config::ConfigV1(config) = config;

        assert_eq!(config.sign_in_route, "/sign-in");
        assert_eq!(config.initial_route, "/");
        assert_eq!(config.gate.poll_interval_ms, 100);
        assert_eq!(config.gate.timeout_ms, 5000);
        assert_eq!(config.routes.len(), 2);
        assert!(config.routes[0].public);
        assert!(!config.routes[1].public);
    }
}
