use std::{fs, io::ErrorKind, num::NonZeroUsize, path::Path, str::FromStr, time::Duration};

use anyhow::Context;
use client_core::{pagination::DEFAULT_PAGE_SIZE, source::DEFAULT_BASE_URL, ListConfig};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "catalog.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub page_size: NonZeroUsize,
    pub debounce_ms: u64,
    pub request_timeout_secs: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.into(),
            page_size: DEFAULT_PAGE_SIZE,
            debounce_ms: 300,
            request_timeout_secs: 30,
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    api_base_url: Option<String>,
    page_size: Option<usize>,
    debounce_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    log_filter: Option<String>,
}

impl Settings {
    pub fn list_config(&self) -> ListConfig {
        ListConfig {
            page_size: self.page_size,
            debounce: Duration::from_millis(self.debounce_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Command-line flags win over every other layer.
    pub fn apply_overrides(
        &mut self,
        api_url: Option<String>,
        page_size: Option<usize>,
        warnings: &mut Vec<String>,
    ) {
        if let Some(v) = api_url {
            self.api_base_url = v;
        }
        if let Some(v) = page_size {
            self.set_page_size(v, "--page-size", warnings);
        }
    }

    fn apply_file(&mut self, raw: &str, warnings: &mut Vec<String>) -> Result<(), toml::de::Error> {
        let file_cfg: FileSettings = toml::from_str(raw)?;
        if let Some(v) = file_cfg.api_base_url {
            self.api_base_url = v;
        }
        if let Some(v) = file_cfg.page_size {
            self.set_page_size(v, "config file", warnings);
        }
        if let Some(v) = file_cfg.debounce_ms {
            self.debounce_ms = v;
        }
        if let Some(v) = file_cfg.request_timeout_secs {
            self.request_timeout_secs = v;
        }
        if let Some(v) = file_cfg.log_filter {
            self.log_filter = v;
        }
        Ok(())
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>, warnings: &mut Vec<String>) {
        if let Some(v) = lookup("CATALOG_API_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = lookup("APP__API_BASE_URL") {
            self.api_base_url = v;
        }

        if let Some(v) = lookup("APP__PAGE_SIZE") {
            if let Some(parsed) = parse_number::<usize>("APP__PAGE_SIZE", &v, warnings) {
                self.set_page_size(parsed, "APP__PAGE_SIZE", warnings);
            }
        }
        if let Some(v) = lookup("APP__DEBOUNCE_MS") {
            if let Some(parsed) = parse_number("APP__DEBOUNCE_MS", &v, warnings) {
                self.debounce_ms = parsed;
            }
        }
        if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
            if let Some(parsed) = parse_number("APP__REQUEST_TIMEOUT_SECS", &v, warnings) {
                self.request_timeout_secs = parsed;
            }
        }

        if let Some(v) = lookup("APP__LOG_FILTER") {
            self.log_filter = v;
        }
    }

    fn set_page_size(&mut self, value: usize, origin: &str, warnings: &mut Vec<String>) {
        self.page_size = NonZeroUsize::new(value).unwrap_or_else(|| {
            warnings.push(format!(
                "page size 0 from {origin} is not usable, using {DEFAULT_PAGE_SIZE}"
            ));
            DEFAULT_PAGE_SIZE
        });
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str, warnings: &mut Vec<String>) -> Option<T> {
    match raw.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warnings.push(format!("ignoring {key}={raw:?}: not a number"));
            None
        }
    }
}

/// Layers defaults, the config file and the environment. A missing
/// `catalog.toml` is fine; a missing file named explicitly is an error.
///
/// Warnings are returned rather than logged because logging is configured
/// from the result.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<(Settings, Vec<String>)> {
    let mut settings = Settings::default();
    let mut warnings = Vec::new();

    let path = config_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => settings
            .apply_file(&raw, &mut warnings)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound && config_path.is_none() => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    settings.apply_env(|key| std::env::var(key).ok(), &mut warnings);
    Ok((settings, warnings))
}
