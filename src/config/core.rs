use anyhow::{Context, Result, bail};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::{SieveConfig, smart_load};

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

const CONFIG_NAMES: [&str; 4] = ["toml", "json", "yaml", "yml"];

/// Layered configuration
///
/// Priority, lowest first: embedded defaults, user config, repository
/// config, the file given with `--config`, `TEXTSIEVE_*` environment
/// variables, command line overrides.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    figment: Figment,
}

impl ConfigLoader {
    pub fn load_with<T: Serialize>(
        custom_config: Option<&Path>,
        cli_overrides: Option<T>,
    ) -> Result<Self> {
        Self::load_from(
            custom_config,
            cli_overrides,
            Self::user_config_dir().as_deref(),
            Path::new("."),
        )
    }

    fn load_from<T: Serialize>(
        custom_config: Option<&Path>,
        cli_overrides: Option<T>,
        user_dir: Option<&Path>,
        repo_dir: &Path,
    ) -> Result<Self> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        if let Some(dir) = user_dir {
            for ext in CONFIG_NAMES {
                let path = dir.join(format!("config.{ext}"));
                if path.is_file() {
                    tracing::trace!("Merging user config {}", path.display());
                    figment = figment.merge(smart_load::auto(&path));
                }
            }
        }

        for ext in CONFIG_NAMES {
            let path = repo_dir.join(format!("textsieve.{ext}"));
            if path.is_file() {
                tracing::trace!("Merging repository config {}", path.display());
                figment = figment.merge(smart_load::auto(&path));
            }
        }

        if let Some(path) = custom_config {
            if !path.is_file() {
                bail!("Config file not found: {}", path.display());
            }
            tracing::trace!("Merging custom config {}", path.display());
            figment = figment.merge(smart_load::auto(path));
        }

        figment = figment.merge(Env::prefixed("TEXTSIEVE_").split("__"));

        if let Some(overrides) = cli_overrides {
            figment = figment.merge(Serialized::defaults(overrides));
        }

        Ok(ConfigLoader { figment })
    }

    /// Typed, validated configuration
    pub fn extract(&self) -> Result<SieveConfig> {
        let config: SieveConfig = self
            .figment
            .extract()
            .context("Invalid textsieve configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Get a nested object/section as JSON
    pub fn get_section(&self, path: &str) -> Result<serde_json::Value> {
        Ok(self.figment.extract_inner(path)?)
    }

    /// Get the full merged configuration as a structured value
    pub fn get_full_config(&self) -> Result<serde_json::Value> {
        Ok(self.figment.extract()?)
    }

    fn user_config_dir() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config").join("textsieve"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::TokenizerKind;
    use crate::parallel::WorkerCount;
    use figment::Jail;
    use serde_json::json;

    fn load_in(jail: &Jail, custom: Option<&Path>, overrides: Option<serde_json::Value>) -> SieveConfig {
        ConfigLoader::load_from(custom, overrides, Some(&jail.directory().join("user")), jail.directory())
            .unwrap()
            .extract()
            .unwrap()
    }

    #[test]
    fn test_embedded_defaults_match_struct_defaults() {
        Jail::expect_with(|jail| {
            assert_eq!(load_in(jail, None, None), SieveConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_layer_priority() {
        Jail::expect_with(|jail| {
            std::fs::create_dir(jail.directory().join("user")).unwrap();
            jail.create_file(
                "user/config.toml",
                "[filter]\nkeywords = [\"user\"]\nchunk_size = 5\nworkers = 2",
            )?;
            jail.create_file("textsieve.yaml", "filter:\n  chunk_size: 7\n")?;
            jail.create_file("custom.json", r#"{"compress": {"max_length": 99}}"#)?;
            jail.set_env("TEXTSIEVE_FILTER__WORKERS", "3");

            let config = load_in(
                jail,
                Some(Path::new("custom.json")),
                Some(json!({"compress": {"tokenizer": "chars"}})),
            );
            assert_eq!(config.filter.keywords, vec!["user"]);
            assert_eq!(config.filter.chunk_size, 7);
            assert_eq!(config.filter.workers, WorkerCount::Fixed(3));
            assert_eq!(config.compress.max_length, 99);
            assert_eq!(config.compress.tokenizer, TokenizerKind::Chars);
            Ok(())
        });
    }

    #[test]
    fn test_cli_overrides_beat_environment() {
        Jail::expect_with(|jail| {
            jail.set_env("TEXTSIEVE_FILTER__CASE_SENSITIVE", "false");
            let config = load_in(jail, None, Some(json!({"filter": {"case_sensitive": true}})));
            assert!(config.filter.case_sensitive);
            Ok(())
        });
    }

    #[test]
    fn test_missing_custom_config_is_an_error() {
        Jail::expect_with(|jail| {
            let result = ConfigLoader::load_from(
                Some(Path::new("nope.toml")),
                None::<()>,
                None,
                jail.directory(),
            );
            assert!(result.is_err());
            Ok(())
        });
    }

    #[test]
    fn test_invalid_workers_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("TEXTSIEVE_FILTER__WORKERS", "0");
            let loader = ConfigLoader::load_from(None, None::<()>, None, jail.directory()).unwrap();
            assert!(loader.extract().is_err());
            Ok(())
        });
    }

    #[test]
    fn test_get_section() {
        Jail::expect_with(|jail| {
            let loader = ConfigLoader::load_from(None, None::<()>, None, jail.directory()).unwrap();
            let output = loader.get_section("output").unwrap();
            assert_eq!(output["file_prefix"], "filtered");
            assert!(loader.get_full_config().unwrap()["filter"].is_object());
            Ok(())
        });
    }
}
