// Open Food Facts barcode lookup. A miss — unknown barcode, network trouble,
// unreadable body — is "no suggestion", never an error the caller must
// handle.

use log::warn;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const OPEN_FOOD_FACTS_BASE: &str = "https://world.openfoodfacts.org/api/v0";

#[derive(Debug, Deserialize)]
struct OffResponse {
    status: i32,
    product: Option<OffProduct>,
}

#[derive(Debug, Deserialize)]
struct OffProduct {
    product_name: Option<String>,
    quantity: Option<String>,
    brands: Option<String>,
    image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductLookup {
    pub found: bool,
    pub name: String,
    pub brand: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ProductLookup {
    fn not_found() -> Self {
        Self {
            found: false,
            name: String::new(),
            brand: String::new(),
            image_url: None,
        }
    }
}

#[derive(Clone)]
pub struct LookupService {
    client: Client,
    base_url: String,
}

impl LookupService {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: OPEN_FOOD_FACTS_BASE.to_string(),
        }
    }

    pub async fn barcode_info(&self, barcode: &str) -> ProductLookup {
        let url = format!("{}/product/{}.json", self.base_url, barcode.trim());

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("open food facts unreachable: {e}");
                return ProductLookup::not_found();
            }
        };

        if !response.status().is_success() {
            return ProductLookup::not_found();
        }

        let data: OffResponse = match response.json().await {
            Ok(d) => d,
            Err(e) => {
                warn!("open food facts body unreadable: {e}");
                return ProductLookup::not_found();
            }
        };

        if data.status != 1 {
            return ProductLookup::not_found();
        }
        let Some(product) = data.product else {
            return ProductLookup::not_found();
        };

        // The package size makes the name more useful in the form.
        let mut name = product.product_name.unwrap_or_default();
        if let Some(quantity) = product.quantity {
            name = format!("{name} {quantity}");
        }

        ProductLookup {
            found: true,
            name: name.trim().to_string(),
            brand: product.brands.unwrap_or_default(),
            image_url: product.image_url,
        }
    }
}
