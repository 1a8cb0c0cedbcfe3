// lib.rs - Shared core for the product catalog admin UI

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod currency;
pub mod event;
pub mod form;
pub mod model;
pub mod query;
pub mod theme;
pub mod view;

use serde::{Deserialize, Serialize};

pub use app::App;
pub use capabilities::{ApiError, CapabilityError, Capabilities, Effect, StorageError};
pub use config::{CatalogConfig, ConfigError};
pub use crux_core::{render::Render, App as CruxApp};
pub use currency::{CurrencyFormatter, LocaleFormat, PriceEditState};
pub use event::Event;
pub use form::{FormErrors, ProductForm};
pub use model::{Model, Product, ProductDraft, ProductId, ProductPatch, Screen};
pub use query::{QueryState, QueryStateController, TableChange};
pub use theme::ThemeMode;
pub use view::ViewModel;

pub const DEFAULT_API_BASE_URL: &str =
    "https://688f9e5ff21ab1769f89b590.mockapi.io/api/products/products";
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_CURRENCY_PREFIX: &str = "R$ ";
pub const THEME_STORAGE_KEY: &str = "darkMode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Timeout,
    NotFound,
    Validation,
    Configuration,
    Storage,
    Deserialization,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION_ERROR",
            Self::Configuration => "CONFIGURATION_ERROR",
            Self::Storage => "STORAGE_ERROR",
            Self::Deserialization => "DESERIALIZATION_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Whether a user retry can reasonably succeed.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Timeout | Self::Storage)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub internal_message: Option<String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            internal_message: None,
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Network => {
                "Unable to reach the catalog service. Please check your connection and try again."
                    .into()
            }
            ErrorKind::Timeout => "The request timed out. Please try again.".into(),
            ErrorKind::NotFound => "The requested product could not be found.".into(),
            ErrorKind::Validation | ErrorKind::Configuration => self.message.clone(),
            ErrorKind::Storage => "Unable to save your preferences on this device.".into(),
            ErrorKind::Deserialization => {
                "The catalog service sent an unexpected response.".into()
            }
            ErrorKind::Unknown => "An unexpected error occurred. Please try again.".into(),
        }
    }

    #[must_use]
    pub fn from_http_status(status: u16) -> Self {
        let kind = match status {
            400 | 422 => ErrorKind::Validation,
            404 => ErrorKind::NotFound,
            408 | 504 => ErrorKind::Timeout,
            500..=599 => ErrorKind::Network,
            _ => ErrorKind::Unknown,
        };
        Self::new(kind, format!("HTTP error: {status}"))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        match &e {
            ApiError::Network { .. } => {
                AppError::new(ErrorKind::Network, "Network error").with_internal(e.to_string())
            }
            ApiError::Timeout => AppError::new(ErrorKind::Timeout, "Request timed out"),
            ApiError::NotFound => AppError::new(ErrorKind::NotFound, "Product not found"),
            ApiError::Status { code } => {
                AppError::from_http_status(*code).with_internal(e.to_string())
            }
            ApiError::Decode { .. } => AppError::new(ErrorKind::Deserialization, "Bad response")
                .with_internal(e.to_string()),
            ApiError::InvalidUrl { .. } => AppError::new(ErrorKind::Configuration, e.to_string()),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::new(ErrorKind::Configuration, e.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        AppError::new(ErrorKind::Storage, "Storage error").with_internal(e.to_string())
    }
}

impl From<CapabilityError> for AppError {
    fn from(e: CapabilityError) -> Self {
        match e {
            CapabilityError::Http(e) => e.into(),
            CapabilityError::Storage(e) => e.into(),
        }
    }
}

impl From<FormErrors> for AppError {
    fn from(e: FormErrors) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}
