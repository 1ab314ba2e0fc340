//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{CategoriesConfig, EngineConfig, LeaveCatalogConfig, PayrollConfig};

/// Loads engine configuration from a directory of YAML files.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── leave_types.yaml  # Leave catalog and backdating roles
/// ├── categories.yaml   # Eligibility and entitlements per employee category
/// └── payroll.yaml      # Working days, overtime, allowances and deductions
/// ```
///
/// # Example
///
/// ```no_run
/// use leave_payroll_engine::config::ConfigLoader;
/// use leave_payroll_engine::models::LeaveTypeCode;
///
/// let config = ConfigLoader::load("./config/default")?;
/// let casual = config.leave_type(LeaveTypeCode::Casual)?;
/// println!("{} allows {} days a month", casual.name, casual.max_per_month);
/// # Ok::<(), leave_payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns the [`EngineConfig`] on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML or unknown codes (`ConfigParseError`)
    /// - A leave type or employee category has no entry (`ConfigParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<EngineConfig> {
        let path = path.as_ref();

        let catalog = Self::load_yaml::<LeaveCatalogConfig>(&path.join("leave_types.yaml"))?;
        let categories = Self::load_yaml::<CategoriesConfig>(&path.join("categories.yaml"))?;
        let payroll = Self::load_yaml::<PayrollConfig>(&path.join("payroll.yaml"))?;

        let config = EngineConfig::new(catalog, categories, payroll).map_err(|message| {
            EngineError::ConfigParseError {
                path: path.display().to_string(),
                message,
            }
        })?;

        tracing::debug!(path = %path.display(), "Loaded engine configuration");
        Ok(config)
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }
}
