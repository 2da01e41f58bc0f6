use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_CONFIG_FILE: &str = "config/dashboard";
const ENV_PREFIX: &str = "DASHBOARD";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Sent as `x-api-key`. Required for every fetch.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
        }
    }
}

impl ReportConfig {
    /// The credential, treating a blank value as absent.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NavigationConfig {
    /// Query parameter carrying the entity id.
    #[serde(default = "default_identity_param")]
    pub identity_param: String,
    /// External "full view" link offered by the renderer. `${entity}` is
    /// replaced with the resolved id.
    #[serde(default)]
    pub full_view_url: Option<String>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            identity_param: default_identity_param(),
            full_view_url: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

fn default_endpoint() -> String {
    "http://localhost:3000/api/dashboard".to_string()
}

fn default_identity_param() -> String {
    "userId".to_string()
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

/// Load from the config file (optional) layered under `DASHBOARD__*`
/// environment variables.
pub fn load_app_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let settings = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace `${name}` placeholders in a template
pub fn fill_template(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
