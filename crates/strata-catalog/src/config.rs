use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// Configuration for the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Upper bound on one repository transaction, from begin to commit.
    #[serde(rename = "transaction_timeout_ms", with = "millis")]
    pub transaction_timeout: Duration,
    /// Page size for workspace listings during a diff. `None` lists each
    /// directory in one call.
    pub diff_page_size: Option<usize>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            transaction_timeout: Duration::from_secs(30),
            diff_page_size: None,
        }
    }
}

impl CatalogConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    ///
    /// ```
    /// use strata_catalog::CatalogConfig;
    ///
    /// let config = CatalogConfig::from_toml_str("diff_page_size = 500").unwrap();
    /// assert_eq!(config.diff_page_size, Some(500));
    /// ```
    pub fn from_toml_str(source: &str) -> CatalogResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| CatalogError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the catalog cannot run with.
    pub fn validate(&self) -> CatalogResult<()> {
        if self.transaction_timeout.is_zero() {
            return Err(CatalogError::Config(
                "transaction_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.diff_page_size == Some(0) {
            return Err(CatalogError::Config(
                "diff_page_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let ms = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(ms)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
