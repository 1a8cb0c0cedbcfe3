use serde::{Deserialize, Serialize};

use crate::capabilities::{ApiError, StorageError};
use crate::config::CatalogConfig;
use crate::model::{Product, ProductId};
use crate::query::{FetchTicket, TableChange};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    Noop,
    AppStarted,
    Configure(Box<CatalogConfig>),

    // Product list
    TableChanged(Box<TableChange>),
    RefreshRequested,
    DeleteRequested {
        id: ProductId,
    },
    DeleteConfirmed,
    DeleteCancelled,

    // Product form
    NewProductRequested,
    EditProductRequested {
        id: ProductId,
    },
    NameChanged(String),
    DescriptionChanged(String),
    CategoryChanged(String),
    /// Raw text of the price field after a keystroke or paste.
    PriceInput(String),
    FormSubmitted,
    FormCancelled,

    // Preferences & notifications
    ToggleTheme,
    DismissToast,
    DismissError,

    // Capability responses (boxed to keep enum size small)
    #[serde(skip)]
    CountLoaded {
        ticket: FetchTicket,
        result: Box<Result<u64, ApiError>>,
    },
    #[serde(skip)]
    PageLoaded {
        ticket: FetchTicket,
        result: Box<Result<Vec<Product>, ApiError>>,
    },
    #[serde(skip)]
    ProductLoaded {
        id: ProductId,
        result: Box<Result<Product, ApiError>>,
    },
    #[serde(skip)]
    SaveResponse {
        result: Box<Result<(), ApiError>>,
    },
    #[serde(skip)]
    DeleteResponse {
        id: ProductId,
        result: Box<Result<(), ApiError>>,
    },
    #[serde(skip)]
    ThemeLoaded(Box<Result<Option<Vec<u8>>, StorageError>>),
    #[serde(skip)]
    ThemePersisted(Box<Result<(), StorageError>>),
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::AppStarted => "app_started",
            Self::Configure(_) => "configure",
            Self::TableChanged(_) => "table_changed",
            Self::RefreshRequested => "refresh_requested",
            Self::DeleteRequested { .. } => "delete_requested",
            Self::DeleteConfirmed => "delete_confirmed",
            Self::DeleteCancelled => "delete_cancelled",
            Self::NewProductRequested => "new_product_requested",
            Self::EditProductRequested { .. } => "edit_product_requested",
            Self::NameChanged(_) => "name_changed",
            Self::DescriptionChanged(_) => "description_changed",
            Self::CategoryChanged(_) => "category_changed",
            Self::PriceInput(_) => "price_input",
            Self::FormSubmitted => "form_submitted",
            Self::FormCancelled => "form_cancelled",
            Self::ToggleTheme => "toggle_theme",
            Self::DismissToast => "dismiss_toast",
            Self::DismissError => "dismiss_error",
            Self::CountLoaded { .. } => "count_loaded",
            Self::PageLoaded { .. } => "page_loaded",
            Self::ProductLoaded { .. } => "product_loaded",
            Self::SaveResponse { .. } => "save_response",
            Self::DeleteResponse { .. } => "delete_response",
            Self::ThemeLoaded(_) => "theme_loaded",
            Self::ThemePersisted(_) => "theme_persisted",
        }
    }

    /// Events that come straight from a user gesture rather than from the
    /// shell's lifecycle or a capability response.
    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::TableChanged(_)
                | Self::RefreshRequested
                | Self::DeleteRequested { .. }
                | Self::DeleteConfirmed
                | Self::DeleteCancelled
                | Self::NewProductRequested
                | Self::EditProductRequested { .. }
                | Self::NameChanged(_)
                | Self::DescriptionChanged(_)
                | Self::CategoryChanged(_)
                | Self::PriceInput(_)
                | Self::FormSubmitted
                | Self::FormCancelled
                | Self::ToggleTheme
                | Self::DismissToast
                | Self::DismissError
        )
    }
}
