use serde::{Deserialize, Serialize};

use crate::form::{category_suggestions, FormField, ProductForm};
use crate::model::{Model, Product, Screen, Toast, ToastKind};
use crate::query::Pagination;
use crate::theme::{ThemeMode, ThemeTokens};
use crate::AppError;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    /// Rendered as a tag, upper-cased.
    pub category: String,
    pub price: String,
    pub description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub id: String,
    pub name: String,
    pub deleting: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldErrors {
    pub nome: Option<String>,
    pub categoria: Option<String>,
    pub preco: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewState {
    ProductList {
        rows: Vec<ProductRow>,
        pagination: Pagination,
        total_pages: u64,
        total_label: String,
        is_loading: bool,
        confirm_delete: Option<DeleteConfirmation>,
    },
    ProductForm {
        title: String,
        submit_label: String,
        nome: String,
        desc: String,
        categoria: String,
        price_text: String,
        price_placeholder: String,
        category_suggestions: Vec<String>,
        errors: FieldErrors,
        is_loading: bool,
        is_saving: bool,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserFacingError {
    pub message: String,
    pub is_retryable: bool,
    pub error_code: String,
}

impl From<&AppError> for UserFacingError {
    fn from(e: &AppError) -> Self {
        Self {
            message: e.user_facing_message(),
            is_retryable: e.is_retryable(),
            error_code: e.code().to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastView {
    pub kind: ToastKind,
    pub message: String,
    pub description: Option<String>,
}

impl From<&Toast> for ToastView {
    fn from(t: &Toast) -> Self {
        Self {
            kind: t.kind,
            message: t.message.clone(),
            description: t.description.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThemeView {
    pub mode: ThemeMode,
    pub is_dark: bool,
    pub tokens: ThemeTokens,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewModel {
    pub state: ViewState,
    pub error: Option<UserFacingError>,
    pub toast: Option<ToastView>,
    pub theme: ThemeView,
}

impl ViewModel {
    #[must_use]
    pub fn from_model(model: &Model) -> Self {
        let state = match (model.screen, model.form.as_ref()) {
            (Screen::ProductForm, Some(form)) => form_state(model, form),
            _ => list_state(model),
        };

        Self {
            state,
            error: model.active_error.as_ref().map(UserFacingError::from),
            toast: model.toast.as_ref().map(ToastView::from),
            theme: ThemeView {
                mode: model.theme.mode,
                is_dark: model.theme.mode.is_dark(),
                tokens: model.theme.mode.tokens(),
            },
        }
    }
}

fn product_row(model: &Model, product: &Product) -> ProductRow {
    ProductRow {
        id: product.id.to_string(),
        name: product.nome.clone(),
        category: product.categoria.to_uppercase(),
        price: model
            .config
            .formatter()
            .price_label(&product.preco, &model.config.currency_prefix),
        description: product.desc.clone(),
    }
}

fn list_state(model: &Model) -> ViewState {
    let catalog = &model.catalog;
    let pagination = catalog.pagination();

    ViewState::ProductList {
        rows: catalog
            .items()
            .iter()
            .map(|product| product_row(model, product))
            .collect(),
        pagination,
        total_pages: catalog.total_pages(),
        total_label: format!("Total: {} products", pagination.total),
        is_loading: catalog.is_loading(),
        confirm_delete: model.pending_delete.as_ref().map(|product| DeleteConfirmation {
            id: product.id.to_string(),
            name: product.nome.clone(),
            deleting: model.deleting,
        }),
    }
}

fn form_state(model: &Model, form: &ProductForm) -> ViewState {
    let message = |field| form.errors.for_field(field).map(ToString::to_string);
    let placeholder = model.config.formatter().initial_display(0.0);

    ViewState::ProductForm {
        title: form.title().to_string(),
        submit_label: if form.is_editing() {
            "Save changes".to_string()
        } else {
            "Add product".to_string()
        },
        nome: form.nome.clone(),
        desc: form.desc.clone(),
        categoria: form.categoria.clone(),
        price_text: form.price.display_text().to_string(),
        price_placeholder: placeholder,
        category_suggestions: category_suggestions(&form.categoria)
            .into_iter()
            .map(String::from)
            .collect(),
        errors: FieldErrors {
            nome: message(FormField::Nome),
            categoria: message(FormField::Categoria),
            preco: message(FormField::Preco),
        },
        is_loading: form.loading,
        is_saving: form.saving,
    }
}
