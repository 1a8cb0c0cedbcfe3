use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::CatalogConfig;
use crate::form::ProductForm;
use crate::query::{QueryDefaults, QueryStateController};
use crate::theme::ThemeState;
use crate::AppError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A catalog record as the backend stores it. Field names are the wire names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub nome: String,
    #[serde(default)]
    pub desc: String,
    /// Decimal as text, e.g. `"12.34"`.
    pub preco: String,
    pub categoria: String,
}

/// Create body: a product without its id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub nome: String,
    pub desc: String,
    pub preco: String,
    pub categoria: String,
}

/// Update body. Absent fields are left untouched by the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preco: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
}

impl From<ProductDraft> for ProductPatch {
    fn from(draft: ProductDraft) -> Self {
        Self {
            nome: Some(draft.nome),
            desc: Some(draft.desc),
            preco: Some(draft.preco),
            categoria: Some(draft.categoria),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    ProductList,
    ProductForm,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub description: Option<String>,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
            description: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Model {
    pub config: CatalogConfig,
    pub screen: Screen,
    pub catalog: QueryStateController<Product>,
    /// Row waiting for the user to confirm deletion.
    pub pending_delete: Option<Product>,
    pub deleting: bool,
    pub form: Option<ProductForm>,
    pub theme: ThemeState,
    pub toast: Option<Toast>,
    /// Latest failure not tied to a form field.
    pub active_error: Option<AppError>,
}

impl Model {
    #[must_use]
    pub fn new(config: CatalogConfig) -> Self {
        let catalog = QueryStateController::initialize(QueryDefaults {
            page_size: config.default_page_size,
            sort: None,
        });
        Self {
            config,
            screen: Screen::ProductList,
            catalog,
            pending_delete: None,
            deleting: false,
            form: None,
            theme: ThemeState::default(),
            toast: None,
            active_error: None,
        }
    }

    pub fn show_toast(&mut self, toast: Toast) {
        self.toast = Some(toast);
    }

    pub fn clear_toast(&mut self) {
        self.toast = None;
    }

    #[must_use]
    pub fn find_product(&self, id: &ProductId) -> Option<&Product> {
        self.catalog.items().iter().find(|product| &product.id == id)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(CatalogConfig::default())
    }
}
