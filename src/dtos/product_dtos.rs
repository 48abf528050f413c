use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::product::{Product, ProductStatus};
use crate::services::expiry::{
    days_until_expiry, expiry_description, is_expired, is_expiring_soon, parse_expiry,
    EXPIRING_SOON_WINDOW,
};
use crate::services::filters::{SortField, SortOrder};

const MAX_NAME_LEN: usize = 200;
const MAX_QUANTITY: i32 = 9999;

#[derive(Debug, Deserialize)]
pub struct CreateProductDTO {
    pub product_name: String,
    pub product_brand: String,
    pub barcode: Option<String>,
    pub expiry_date: String,
    pub quantity: i32,
    #[serde(default)]
    pub status: ProductStatus,
}

/// Partial update; only present fields reach the PATCH body.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateProductDTO {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteDTO {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct BulkStatusDTO {
    pub ids: Vec<Uuid>,
    pub status: ProductStatus,
}

/// Query parameters of the product listing and the report endpoints. The
/// derivation pipeline applies them in memory over the fetched snapshot.
#[derive(Debug, Default, Deserialize)]
pub struct ListProductsQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub session: Option<String>,
    pub days: Option<String>,
    pub sort: Option<SortField>,
    pub order: Option<SortOrder>,
    /// Admin only: a user id to view as, or `all`.
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateProductQuery {
    /// Run the product name through the spelling corrector before saving.
    pub correct: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SessionGroupOut {
    pub session: String,
    pub products: Vec<Product>,
}

/// Product as listed: the stored row plus its computed urgency. The stored
/// `status` and the derived expiry fields stay separate; table badges and
/// report classification apply different precedence rules over them.
#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub days_until_expiry: i64,
    pub expired: bool,
    pub expiring_soon: bool,
    pub expiry_text: String,
    pub status_label: &'static str,
}

impl ProductView {
    pub fn from_product(product: Product, today: NaiveDate) -> Self {
        let days = days_until_expiry(&product.expiry_date, today);
        Self {
            days_until_expiry: days,
            expired: is_expired(days),
            expiring_soon: is_expiring_soon(days, EXPIRING_SOON_WINDOW),
            expiry_text: expiry_description(days),
            status_label: product.status.label(),
            product,
        }
    }
}

fn barcode_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // EAN-8, UPC-A, EAN-13 and ITF-14.
    RE.get_or_init(|| Regex::new(r"^\d{8}$|^\d{12,14}$").expect("barcode regex"))
}

pub fn is_valid_barcode(barcode: &str) -> bool {
    barcode_regex().is_match(barcode.trim())
}

fn validate_barcode(barcode: Option<&str>, errors: &mut Vec<String>) {
    if let Some(code) = barcode {
        if !code.trim().is_empty() && !is_valid_barcode(code) {
            errors.push("Código de barras inválido".to_string());
        }
    }
}

impl CreateProductDTO {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.product_name.trim().is_empty() {
            errors.push("Nome do produto é obrigatório".to_string());
        } else if self.product_name.chars().count() > MAX_NAME_LEN {
            errors.push("Nome muito longo (máximo 200 caracteres)".to_string());
        }

        if self.product_brand.trim().is_empty() {
            errors.push("Sessão é obrigatória".to_string());
        }

        if self.expiry_date.trim().is_empty() {
            errors.push("Data de validade é obrigatória".to_string());
        } else if parse_expiry(&self.expiry_date).is_none() {
            errors.push("Data inválida".to_string());
        }

        if self.quantity < 1 {
            errors.push("Quantidade deve ser maior que zero".to_string());
        } else if self.quantity > MAX_QUANTITY {
            errors.push("Quantidade muito alta".to_string());
        }

        validate_barcode(self.barcode.as_deref(), &mut errors);
        errors
    }
}

impl UpdateProductDTO {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(name) = &self.product_name {
            if name.trim().is_empty() {
                errors.push("Nome do produto é obrigatório".to_string());
            } else if name.chars().count() > MAX_NAME_LEN {
                errors.push("Nome muito longo (máximo 200 caracteres)".to_string());
            }
        }
        if let Some(brand) = &self.product_brand {
            if brand.trim().is_empty() {
                errors.push("Sessão é obrigatória".to_string());
            }
        }
        if let Some(date) = &self.expiry_date {
            if parse_expiry(date).is_none() {
                errors.push("Data inválida".to_string());
            }
        }
        if let Some(quantity) = self.quantity {
            if quantity < 1 {
                errors.push("Quantidade deve ser maior que zero".to_string());
            } else if quantity > MAX_QUANTITY {
                errors.push("Quantidade muito alta".to_string());
            }
        }

        validate_barcode(self.barcode.as_deref(), &mut errors);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.product_name.is_none()
            && self.product_brand.is_none()
            && self.barcode.is_none()
            && self.expiry_date.is_none()
            && self.quantity.is_none()
            && self.status.is_none()
    }
}
