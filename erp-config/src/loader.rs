//! Configuration loader implementations.

use std::path::Path;

use erp_store::{Dataset, LookupStore};
use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{AppConfig, DatasetSource};

/// Overrides the dataset with a JSON file path.
pub const ENV_DATASET: &str = "ERP_DATASET";
/// Overrides the miss policy (`surface` or `zero_default`).
pub const ENV_MISS_POLICY: &str = "ERP_MISS_POLICY";
/// Overrides the log format (`text` or `json`).
pub const ENV_LOG_FORMAT: &str = "ERP_LOG_FORMAT";

impl AppConfig {
    /// Decodes a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed documents or unknown keys.
    pub fn from_json(raw: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads a configuration file. A relative dataset path is resolved
    /// against the directory holding the file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it cannot be decoded.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let raw = read(path)?;
        let mut config = Self::from_json(&raw)?;
        if let DatasetSource::File { path: dataset } = &mut config.dataset
            && dataset.is_relative()
            && let Some(dir) = path.parent()
        {
            *dataset = dir.join(&*dataset);
        }
        debug!(path = %path.display(), "configuration file loaded");
        Ok(config)
    }

    /// Applies overrides read through `lookup`, normally the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] for unparseable values.
    pub fn apply_env<F>(&mut self, lookup: &F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String> + ?Sized,
    {
        if let Some(path) = lookup(ENV_DATASET).filter(|value| !value.trim().is_empty()) {
            self.dataset = DatasetSource::File { path: path.into() };
        }
        if let Some(policy) = lookup(ENV_MISS_POLICY) {
            self.miss_policy = policy.parse().map_err(|reason| ConfigError::InvalidOverride {
                var: ENV_MISS_POLICY,
                reason,
            })?;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.log.format = format.parse().map_err(|reason| ConfigError::InvalidOverride {
                var: ENV_LOG_FORMAT,
                reason,
            })?;
        }
        Ok(())
    }

    /// Loads the optional file, then applies process environment overrides.
    ///
    /// # Errors
    ///
    /// Propagates [`AppConfig::from_file`] and [`AppConfig::apply_env`]
    /// failures.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(&|var: &str| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Produces the dataset named by [`AppConfig::dataset`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] or [`ConfigError::Store`] when a dataset
    /// file cannot be read or decoded.
    pub fn load_dataset(&self) -> ConfigResult<Dataset> {
        match &self.dataset {
            DatasetSource::Builtin => Ok(Dataset::builtin()),
            DatasetSource::File { path } => {
                let raw = read(path)?;
                let dataset = Dataset::from_json(&raw)?;
                info!(
                    path = %path.display(),
                    products = dataset.products.len(),
                    counterparties = dataset.counterparties.len(),
                    "dataset loaded from file"
                );
                Ok(dataset)
            }
        }
    }

    /// Loads the dataset and indexes it into a [`LookupStore`].
    ///
    /// # Errors
    ///
    /// Propagates [`AppConfig::load_dataset`] failures and store construction
    /// errors.
    pub fn build_store(&self) -> ConfigResult<LookupStore> {
        Ok(LookupStore::from_dataset(&self.load_dataset()?)?)
    }
}

fn read(path: &Path) -> ConfigResult<String> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;

    use erp_tools::catalog::MissPolicy;

    use super::*;
    use crate::schema::LogFormat;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = AppConfig::default();
        config
            .apply_env(&env(&[
                (ENV_DATASET, "/srv/erp/dataset.json"),
                (ENV_MISS_POLICY, "zero-default"),
                (ENV_LOG_FORMAT, "json"),
            ]))
            .expect("overrides");

        assert_eq!(
            config.dataset,
            DatasetSource::File {
                path: "/srv/erp/dataset.json".into()
            }
        );
        assert_eq!(config.miss_policy, MissPolicy::ZeroDefault);
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn bad_override_is_reported() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(&env(&[(ENV_MISS_POLICY, "shrug")]))
            .expect_err("invalid policy");
        assert!(matches!(err, ConfigError::InvalidOverride { var, .. } if var == ENV_MISS_POLICY));
    }

    #[test]
    fn relative_dataset_path_resolves_next_to_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("dataset.json"),
            r#"{ "products": { "Лампа Настольная": 7 } }"#,
        )
        .expect("write dataset");
        let config_path = dir.path().join("config.json");
        fs::write(
            &config_path,
            r#"{ "dataset": { "source": "file", "path": "dataset.json" } }"#,
        )
        .expect("write config");

        let config = AppConfig::from_file(&config_path).expect("config");
        let store = config.build_store().expect("store");
        assert_eq!(store.stock_balance("лампа настольная").unwrap(), 7);
    }

    #[test]
    fn builtin_dataset_by_default() {
        let store = AppConfig::default().build_store().expect("store");
        assert_eq!(store.product_count(), 4);
        assert_eq!(store.counterparty_count(), 3);
    }

    #[test]
    fn missing_dataset_file_is_io_error() {
        let config = AppConfig {
            dataset: DatasetSource::File {
                path: "/definitely/not/here.json".into(),
            },
            ..AppConfig::default()
        };
        assert!(matches!(config.load_dataset(), Err(ConfigError::Io { .. })));
    }
}
