//! Environment configuration.
//!
//! Settings come from process environment variables, optionally seeded from a
//! `.env` file. Required variables are checked before any file or store I/O.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub const MONGO_URI: &str = "MONGO_URI";
pub const DB_NAME: &str = "DB_NAME";
pub const COLLECTION_NAME: &str = "COLLECTION_NAME";
pub const DATA_FILE: &str = "DATA_FILE";
pub const REFERENCE_YEAR: &str = "MEDMIG_REFERENCE_YEAR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {var} is not set")]
    Missing { var: &'static str },

    #[error("environment variable {var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("failed to load environment file {path}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

/// Store destination and source file for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    pub store_uri: String,
    pub database: String,
    pub collection: String,
    /// Not needed by the CRUD walkthrough, so checked on use.
    pub data_file: Option<PathBuf>,
    pub reference_year: Option<i32>,
}

impl MigrationConfig {
    /// Read from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &'static str| {
            lookup(var)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let require = |var: &'static str| get(var).ok_or(ConfigError::Missing { var });

        let store_uri = require(MONGO_URI)?;
        let database = require(DB_NAME)?;
        let collection = require(COLLECTION_NAME)?;
        let data_file = get(DATA_FILE).map(PathBuf::from);
        let reference_year = get(REFERENCE_YEAR)
            .map(|value| {
                value.parse::<i32>().map_err(|_| ConfigError::Invalid {
                    var: REFERENCE_YEAR,
                    value,
                    reason: "expected a calendar year",
                })
            })
            .transpose()?;

        Ok(Self {
            store_uri,
            database,
            collection,
            data_file,
            reference_year,
        })
    }

    #[must_use]
    pub fn with_data_file(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.data_file = path;
        }
        self
    }

    #[must_use]
    pub fn with_reference_year(mut self, year: Option<i32>) -> Self {
        if year.is_some() {
            self.reference_year = year;
        }
        self
    }

    pub fn data_file(&self) -> Result<&Path, ConfigError> {
        self.data_file
            .as_deref()
            .ok_or(ConfigError::Missing { var: DATA_FILE })
    }
}

/// Load a `.env` file into the process environment.
///
/// An explicit path must exist. Without one, a `.env` found by searching
/// upward from the working directory is loaded if present.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    match path {
        Some(path) => dotenvy::from_path(path)
            .map(|()| Some(path.to_path_buf()))
            .map_err(|source| ConfigError::EnvFile {
                path: path.to_path_buf(),
                source,
            }),
        None => Ok(dotenvy::dotenv().ok()),
    }
}
