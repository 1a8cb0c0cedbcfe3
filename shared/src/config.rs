use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::ValidatedUrl;
use crate::currency::{CurrencyFormatter, LocaleFormat};
use crate::{DEFAULT_API_BASE_URL, DEFAULT_CURRENCY_PREFIX, DEFAULT_PAGE_SIZE};

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigError {
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("page size must be at least 1")]
    ZeroPageSize,

    #[error("group and decimal separators must differ (both '{0}')")]
    SeparatorsCollide(char),

    #[error("separator '{0}' must not be a digit")]
    DigitSeparator(char),

    #[error("malformed configuration: {0}")]
    Parse(String),
}

/// Settings the shell hands to the core at start-up.
///
/// Every field has a default, so a partial JSON document is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Collection URL of the products resource.
    pub api_base_url: String,
    pub default_page_size: u32,
    pub locale: LocaleFormat,
    /// Shown before amounts in the product table.
    pub currency_prefix: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
            locale: LocaleFormat::default(),
            currency_prefix: DEFAULT_CURRENCY_PREFIX.to_string(),
        }
    }
}

impl CatalogConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ValidatedUrl::new(&self.api_base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.api_base_url.clone(),
            reason: e.to_string(),
        })?;

        if self.default_page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }

        let LocaleFormat {
            group_separator,
            decimal_separator,
        } = self.locale;
        for separator in [group_separator, decimal_separator] {
            if separator.is_ascii_digit() {
                return Err(ConfigError::DigitSeparator(separator));
            }
        }
        if group_separator == decimal_separator {
            return Err(ConfigError::SeparatorsCollide(group_separator));
        }

        Ok(())
    }

    #[must_use]
    pub const fn formatter(&self) -> CurrencyFormatter {
        CurrencyFormatter::new(self.locale)
    }
}
