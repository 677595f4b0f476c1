use super::Settings;
use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::Serialize;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

pub struct ZipmergeConfig {
    figment: Figment,
}

impl ZipmergeConfig {
    pub fn load() -> Result<Self> {
        Self::load_with_custom_config(None)
    }

    pub fn load_with_custom_config(custom_config: Option<&str>) -> Result<Self> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG)); // Embedded defaults

        // A custom config replaces the user and repository files
        if let Some(custom_path) = custom_config {
            figment = match custom_path.rsplit('.').next() {
                Some("json") => figment.merge(Json::file(custom_path)),
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(custom_path)),
                _ => figment.merge(Toml::file(custom_path)),
            };
        } else {
            let user = Self::user_config_base();
            figment = figment
                // User config - support multiple formats
                .merge(Toml::file(format!("{user}.toml")))
                .merge(Json::file(format!("{user}.json")))
                .merge(Yaml::file(format!("{user}.yaml")))
                .merge(Yaml::file(format!("{user}.yml")))
                // Repository config - support multiple formats
                .merge(Toml::file("zipmerge.toml"))
                .merge(Json::file("zipmerge.json"))
                .merge(Yaml::file("zipmerge.yaml"))
                .merge(Yaml::file("zipmerge.yml"));
        }

        // Environment variables always beat files
        figment = figment.merge(Env::prefixed("ZIPMERGE_").split("__"));

        tracing::trace!("CONFIG LOAD: custom config = {:?}", custom_config);
        Ok(ZipmergeConfig { figment })
    }

    /// Layer one CLI value on top of every other source
    ///
    /// `key` is a dotted path such as `pipeline.strategy`; `None` leaves the
    /// lower layers untouched.
    pub fn with_override<T: Serialize>(mut self, key: &str, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.figment = self.figment.merge(Serialized::default(key, value));
        }
        self
    }

    /// Extract the typed settings and validate them
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .context("Failed to parse configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Render the merged configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        let settings = self.settings()?;
        toml::to_string_pretty(&settings).context("Failed to render configuration")
    }

    fn user_config_base() -> String {
        match std::env::var("HOME") {
            Ok(home) => format!("{home}/.config/zipmerge/config"),
            Err(_) => "~/.config/zipmerge/config".to_string(),
        }
    }
}
