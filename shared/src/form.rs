//! Product create/edit form.
//!
//! Holds the raw field values, the masked price and per-field errors.
//! Validation happens here, before anything is sent: a form that fails
//! [`ProductForm::validate`] never leaves the core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::currency::{CurrencyFormatter, PriceEditState};
use crate::model::{Product, ProductDraft, ProductId, ProductPatch};

pub const CATEGORY_OPTIONS: &[&str] = &[
    "Eletrônicos",
    "Esportes",
    "Casa e Cozinha",
    "Livros",
    "Ferramentas",
    "Roupas",
    "Beleza e Cuidados Pessoais",
    "Brinquedos",
    "Saúde",
    "Automotivo",
    "Música",
    "Games",
    "Outros",
    "Tecnologia",
    "Acessórios",
    "Alimentos e Bebidas",
    "Pets",
    "Jardinagem",
    "Arte e Artesanato",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Nome,
    Categoria,
    Preco,
}

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormError {
    #[error("Please enter the product name.")]
    MissingName,
    #[error("Please select a category.")]
    MissingCategory,
    #[error("Please select a valid category.")]
    UnknownCategory,
    #[error("Please enter a valid price.")]
    InvalidPrice,
}

impl FormError {
    #[must_use]
    pub const fn field(&self) -> FormField {
        match self {
            Self::MissingName => FormField::Nome,
            Self::MissingCategory | Self::UnknownCategory => FormField::Categoria,
            Self::InvalidPrice => FormField::Preco,
        }
    }
}

#[derive(Debug, Clone, Default, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{} field(s) need attention", .errors.len())]
pub struct FormErrors {
    pub errors: Vec<FormError>,
}

impl FormErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn for_field(&self, field: FormField) -> Option<&FormError> {
        self.errors.iter().find(|error| error.field() == field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormMode {
    Create,
    Edit(ProductId),
}

/// Body of a validated submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Create(ProductDraft),
    Update(ProductId, ProductPatch),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductForm {
    pub mode: FormMode,
    pub nome: String,
    pub desc: String,
    pub categoria: String,
    pub price: PriceEditState,
    pub errors: FormErrors,
    /// Edit target still being fetched.
    pub loading: bool,
    pub saving: bool,
}

impl ProductForm {
    #[must_use]
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            nome: String::new(),
            desc: String::new(),
            categoria: String::new(),
            price: PriceEditState::default(),
            errors: FormErrors::default(),
            loading: false,
            saving: false,
        }
    }

    /// Empty edit form waiting for its product to load.
    #[must_use]
    pub fn loading(id: ProductId) -> Self {
        Self {
            mode: FormMode::Edit(id),
            loading: true,
            ..Self::create()
        }
    }

    #[must_use]
    pub fn edit(product: &Product, formatter: &CurrencyFormatter) -> Self {
        Self {
            mode: FormMode::Edit(product.id.clone()),
            nome: product.nome.clone(),
            desc: product.desc.clone(),
            categoria: product.categoria.clone(),
            price: PriceEditState::from_price_text(&product.preco, formatter),
            ..Self::create()
        }
    }

    #[must_use]
    pub const fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    #[must_use]
    pub fn title(&self) -> &'static str {
        if self.is_editing() {
            "Edit product"
        } else {
            "Add new product"
        }
    }

    pub fn set_price_input(&mut self, raw: &str, formatter: &CurrencyFormatter) {
        self.price = formatter.format(raw);
        self.clear_error(FormField::Preco);
    }

    pub fn set_nome(&mut self, value: String) {
        self.nome = value;
        self.clear_error(FormField::Nome);
    }

    pub fn set_categoria(&mut self, value: String) {
        self.categoria = value;
        self.clear_error(FormField::Categoria);
    }

    pub fn set_desc(&mut self, value: String) {
        self.desc = value;
    }

    /// Checks every field and records the failures on the form.
    pub fn validate(&mut self) -> Result<(), FormErrors> {
        let mut errors = Vec::new();

        if self.nome.trim().is_empty() {
            errors.push(FormError::MissingName);
        }

        let categoria = self.categoria.trim();
        if categoria.is_empty() {
            errors.push(FormError::MissingCategory);
        } else if !CATEGORY_OPTIONS.contains(&categoria) {
            errors.push(FormError::UnknownCategory);
        }

        if !self.price.is_valid_price() {
            errors.push(FormError::InvalidPrice);
        }

        self.errors = FormErrors { errors };
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors.clone())
        }
    }

    /// Validates and builds the request body.
    pub fn submission(&mut self) -> Result<Submission, FormErrors> {
        self.validate()?;

        let preco = self
            .price
            .numeric_value()
            .map(|value| value.to_string())
            .unwrap_or_default();
        let draft = ProductDraft {
            nome: self.nome.trim().to_string(),
            desc: self.desc.clone(),
            preco,
            categoria: self.categoria.trim().to_string(),
        };

        Ok(match &self.mode {
            FormMode::Create => Submission::Create(draft),
            FormMode::Edit(id) => Submission::Update(id.clone(), draft.into()),
        })
    }

    fn clear_error(&mut self, field: FormField) {
        self.errors.errors.retain(|error| error.field() != field);
    }
}

/// Category options containing `input`, case-insensitively.
#[must_use]
pub fn category_suggestions(input: &str) -> Vec<&'static str> {
    let needle = input.to_uppercase();
    CATEGORY_OPTIONS
        .iter()
        .copied()
        .filter(|option| option.to_uppercase().contains(&needle))
        .collect()
}
