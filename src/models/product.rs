use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row of the `products` table as Supabase returns it.
///
/// `expiry_date` stays a raw ISO string (`YYYY-MM-DD`): rows written with a
/// malformed date must still deserialize, and the expiry calculator treats
/// them as day zero instead of failing the whole listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_name: String,
    pub product_brand: String,
    pub barcode: Option<String>,
    pub expiry_date: String,
    pub quantity: i32,
    pub status: ProductStatus,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Markdown stage of a product. Independent of computed expiry urgency:
/// a `Normal` product can already be past its date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Normal,
    PrimeiraRebaixa,
    SegundaRebaixa,
}

impl ProductStatus {
    /// Wire value stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Normal => "normal",
            ProductStatus::PrimeiraRebaixa => "primeira_rebaixa",
            ProductStatus::SegundaRebaixa => "segunda_rebaixa",
        }
    }

    /// Human label used in exports and tables.
    pub fn label(&self) -> &'static str {
        match self {
            ProductStatus::Normal => "Normal",
            ProductStatus::PrimeiraRebaixa => "Rebaixa 1",
            ProductStatus::SegundaRebaixa => "Rebaixa 2",
        }
    }
}

impl Default for ProductStatus {
    fn default() -> Self {
        ProductStatus::Normal
    }
}

/// Insert payload for the `products` table. The owning user is always set
/// server-side from the verified token, never taken from the request body.
#[derive(Debug, Serialize)]
pub struct NewProduct {
    pub user_id: Uuid,
    pub product_name: String,
    pub product_brand: String,
    pub barcode: Option<String>,
    pub expiry_date: String,
    pub quantity: i32,
    pub status: ProductStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_wire_values() {
        for status in [
            ProductStatus::Normal,
            ProductStatus::PrimeiraRebaixa,
            ProductStatus::SegundaRebaixa,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            let back: ProductStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn status_labels() {
        assert_eq!(ProductStatus::Normal.label(), "Normal");
        assert_eq!(ProductStatus::PrimeiraRebaixa.label(), "Rebaixa 1");
        assert_eq!(ProductStatus::SegundaRebaixa.label(), "Rebaixa 2");
    }
}
