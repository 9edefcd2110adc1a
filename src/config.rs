use std::num::NonZeroUsize;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

use crate::{
    Result, CODE_SPACE, CONFIG_FILE, DEFAULT_BASE_URL, DEFAULT_OUTPUT_DIR, DEFAULT_REFERER_BASE,
    DEFAULT_TIMEOUT_SECS,
};

/// Run configuration.
/// Every field has a default, so a bare run with no `Harvest.toml` and no
/// `HARVEST_*` env vars targets the real service directly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Endpoint prefix; the rendered code is appended as the last path segment.
    pub base_url: String,
    /// Referer prefix; the full Referer is `{referer_base}/{code}/matriz`.
    pub referer_base: String,
    pub output_dir: PathBuf,
    /// Worker concurrency. 0 means one worker per logical CPU.
    pub workers: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Codes [0, code_space) are harvested. Capped at the full namespace;
    /// tunable downward so tests can drive the whole pipeline cheaply.
    pub code_space: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            referer_base: DEFAULT_REFERER_BASE.into(),
            output_dir: DEFAULT_OUTPUT_DIR.into(),
            workers: 0,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            code_space: CODE_SPACE,
        }
    }
}

impl Config {
    /// Merges an optional `Harvest.toml` with `HARVEST_`-prefixed environment
    /// variables over the defaults. A missing file is fine.
    pub fn load() -> Result<Self> {
        let config = Figment::new()
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("HARVEST_"))
            .extract()?;
        Ok(config)
    }

    /// Effective worker count, resolving 0 to the host's logical parallelism.
    pub fn workers(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        }
    }

    pub fn code_space(&self) -> u16 {
        self.code_space.min(CODE_SPACE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml_str: &str) -> Result<Config> {
        let config = Figment::new().merge(Toml::string(toml_str)).extract()?;
        Ok(config)
    }

    #[test]
    fn defaults_match_the_real_service() {
        let config = Config::default();
        assert_eq!(
            config.base_url,
            "https://graduacao.ufms.br/portal/matriz/get-pre-requisitos"
        );
        assert_eq!(config.output_dir, PathBuf::from("json"));
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.code_space(), 10_000);
        assert!(config.workers() >= 1);
    }

    #[test]
    fn toml_overrides_take_effect() {
        let config = from_toml(
            r#"
            workers = 3
            output_dir = "out"
            code_space = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.workers(), 3);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.code_space(), 50);
        // untouched fields keep their defaults
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn code_space_is_capped_at_the_namespace() {
        let config = from_toml("code_space = 60000").unwrap();
        assert_eq!(config.code_space(), 10_000);
    }

    #[test]
    fn bad_types_are_a_config_error() {
        let result = from_toml(r#"workers = "many""#);
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }
}
