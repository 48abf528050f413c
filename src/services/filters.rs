// In-memory filter and sort engine over product snapshots. Each filter is a
// pure predicate over the full field set, so composition order never changes
// the result.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::product::Product;
use crate::services::expiry::{days_until_expiry, parse_expiry, EXPIRING_SOON_WINDOW};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Name,
    Date,
    Quantity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Sort selection with the table-header toggle semantics: re-selecting the
/// active field flips the direction, a new field starts ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortState {
    pub fn new(field: SortField) -> Self {
        Self {
            field,
            order: SortOrder::Asc,
        }
    }

    pub fn toggle(self, field: SortField) -> Self {
        if self.field == field {
            let order = match self.order {
                SortOrder::Asc => SortOrder::Desc,
                SortOrder::Desc => SortOrder::Asc,
            };
            Self { field, order }
        } else {
            Self::new(field)
        }
    }
}

/// Case-insensitive substring match against name, barcode and session.
/// A blank term is a no-op.
pub fn filter_by_search(products: &[Product], term: &str) -> Vec<Product> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return products.to_vec();
    }

    products
        .iter()
        .filter(|p| {
            p.product_name.to_lowercase().contains(&term)
                || p.barcode
                    .as_deref()
                    .is_some_and(|b| b.to_lowercase().contains(&term))
                || p.product_brand.to_lowercase().contains(&term)
        })
        .cloned()
        .collect()
}

/// `all` passes through; `vencido`/`vencendo` select by computed days; any
/// other value matches the stored status literally.
pub fn filter_by_status(products: &[Product], status_filter: &str, today: NaiveDate) -> Vec<Product> {
    match status_filter {
        "all" => products.to_vec(),
        "vencido" => products
            .iter()
            .filter(|p| days_until_expiry(&p.expiry_date, today) < 0)
            .cloned()
            .collect(),
        "vencendo" => products
            .iter()
            .filter(|p| {
                let days = days_until_expiry(&p.expiry_date, today);
                (0..=EXPIRING_SOON_WINDOW).contains(&days)
            })
            .cloned()
            .collect(),
        literal => products
            .iter()
            .filter(|p| p.status.as_str() == literal)
            .cloned()
            .collect(),
    }
}

/// Day-horizon filter used by the dashboard chips: `expired`, `0`, `7`, `15`
/// or `30`. Unknown values pass through.
pub fn filter_by_days(products: &[Product], days_filter: &str, today: NaiveDate) -> Vec<Product> {
    if days_filter == "all" {
        return products.to_vec();
    }

    products
        .iter()
        .filter(|p| {
            let days = days_until_expiry(&p.expiry_date, today);
            match days_filter {
                "expired" => days < 0,
                "0" => days == 0,
                "7" => (0..=7).contains(&days),
                "15" => (0..=15).contains(&days),
                "30" => (0..=30).contains(&days),
                _ => true,
            }
        })
        .cloned()
        .collect()
}

/// `all` passes through; anything else is an exact session match.
pub fn filter_by_session(products: &[Product], session_filter: &str) -> Vec<Product> {
    if session_filter == "all" {
        return products.to_vec();
    }
    products
        .iter()
        .filter(|p| p.product_brand == session_filter)
        .cloned()
        .collect()
}

/// Stable sort; equal keys keep their relative input order. Name ordering is
/// case-insensitive, dates compare by parsed value with unparseable dates
/// sorting first.
pub fn sort_products(products: &mut [Product], state: SortState) {
    products.sort_by(|a, b| {
        let ordering = match state.field {
            SortField::Name => a
                .product_name
                .to_lowercase()
                .cmp(&b.product_name.to_lowercase()),
            SortField::Date => date_key(a).cmp(&date_key(b)),
            SortField::Quantity => a.quantity.cmp(&b.quantity),
        };
        match state.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn date_key(product: &Product) -> NaiveDate {
    parse_expiry(&product.expiry_date).unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::ProductStatus;
    use uuid::Uuid;

    fn product(name: &str, brand: &str, barcode: Option<&str>, expiry: &str, qty: i32, status: ProductStatus) -> Product {
        Product {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            product_name: name.to_string(),
            product_brand: brand.to_string(),
            barcode: barcode.map(str::to_string),
            expiry_date: expiry.to_string(),
            quantity: qty,
            status,
            created_at: None,
            updated_at: None,
        }
    }

    fn sample() -> Vec<Product> {
        vec![
            product("Leite Integral", "Laticínios & Danones", Some("7891000100103"), "2024-01-05", 3, ProductStatus::Normal),
            product("Arroz Branco", "Farináceos & Leites", None, "2024-02-05", 1, ProductStatus::Normal),
            product("Iogurte Morango", "Laticínios & Danones", Some("7891000244455"), "2024-01-12", 2, ProductStatus::PrimeiraRebaixa),
            product("Detergente", "Limpeza", Some("7896098900123"), "2024-01-20", 2, ProductStatus::SegundaRebaixa),
        ]
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn blank_search_is_a_no_op() {
        let products = sample();
        let out = filter_by_search(&products, "   ");
        assert_eq!(out.len(), products.len());
    }

    #[test]
    fn search_matches_name_barcode_and_session() {
        let products = sample();
        assert_eq!(filter_by_search(&products, "leite")[0].product_name, "Leite Integral");
        // "leite" also hits the "Farináceos & Leites" session.
        assert_eq!(filter_by_search(&products, "leite").len(), 2);
        assert_eq!(filter_by_search(&products, "7896098").len(), 1);
        assert_eq!(filter_by_search(&products, "laticínios").len(), 2);
    }

    #[test]
    fn status_filter_understands_computed_and_literal_values() {
        let products = sample();
        let expired = filter_by_status(&products, "vencido", today());
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].product_name, "Leite Integral");

        let expiring = filter_by_status(&products, "vencendo", today());
        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].product_name, "Iogurte Morango");

        let rebaixa = filter_by_status(&products, "primeira_rebaixa", today());
        assert_eq!(rebaixa.len(), 1);
        assert_eq!(filter_by_status(&products, "all", today()).len(), 4);
    }

    #[test]
    fn days_filter_windows() {
        let products = sample();
        assert_eq!(filter_by_days(&products, "expired", today()).len(), 1);
        assert_eq!(filter_by_days(&products, "7", today()).len(), 1);
        assert_eq!(filter_by_days(&products, "15", today()).len(), 2);
        assert_eq!(filter_by_days(&products, "30", today()).len(), 3);
        assert_eq!(filter_by_days(&products, "all", today()).len(), 4);
    }

    #[test]
    fn session_filter_is_exact() {
        let products = sample();
        assert_eq!(filter_by_session(&products, "Limpeza").len(), 1);
        assert_eq!(filter_by_session(&products, "Lim").len(), 0);
        assert_eq!(filter_by_session(&products, "all").len(), 4);
    }

    #[test]
    fn filters_compose_order_independently() {
        let products = sample();
        let today = today();

        let a = filter_by_session(
            &filter_by_status(&filter_by_search(&products, "o"), "vencendo", today),
            "Laticínios & Danones",
        );
        let b = filter_by_search(
            &filter_by_session(&filter_by_status(&products, "vencendo", today), "Laticínios & Danones"),
            "o",
        );
        let ids_a: Vec<_> = a.iter().map(|p| p.id).collect();
        let ids_b: Vec<_> = b.iter().map(|p| p.id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn quantity_sort_and_toggle() {
        let mut products = vec![
            product("A", "S", None, "2024-01-01", 3, ProductStatus::Normal),
            product("B", "S", None, "2024-01-01", 1, ProductStatus::Normal),
            product("C", "S", None, "2024-01-01", 2, ProductStatus::Normal),
        ];

        let mut state = SortState::new(SortField::Quantity);
        sort_products(&mut products, state);
        let quantities: Vec<_> = products.iter().map(|p| p.quantity).collect();
        assert_eq!(quantities, vec![1, 2, 3]);

        state = state.toggle(SortField::Quantity);
        assert_eq!(state.order, SortOrder::Desc);
        sort_products(&mut products, state);
        let quantities: Vec<_> = products.iter().map(|p| p.quantity).collect();
        assert_eq!(quantities, vec![3, 2, 1]);

        // Picking another field resets to ascending.
        state = state.toggle(SortField::Name);
        assert_eq!(state, SortState::new(SortField::Name));
    }

    #[test]
    fn sort_is_stable_on_equal_keys() {
        let mut products = vec![
            product("Primeiro", "S", None, "2024-02-01", 5, ProductStatus::Normal),
            product("Segundo", "S", None, "2024-02-01", 5, ProductStatus::Normal),
            product("Terceiro", "S", None, "2024-01-01", 5, ProductStatus::Normal),
        ];
        sort_products(&mut products, SortState::new(SortField::Date));
        let names: Vec<_> = products.iter().map(|p| p.product_name.as_str()).collect();
        assert_eq!(names, vec!["Terceiro", "Primeiro", "Segundo"]);
    }

    #[test]
    fn name_sort_is_case_insensitive() {
        let mut products = vec![
            product("banana", "S", None, "2024-01-01", 1, ProductStatus::Normal),
            product("Abacaxi", "S", None, "2024-01-01", 1, ProductStatus::Normal),
        ];
        sort_products(&mut products, SortState::new(SortField::Name));
        assert_eq!(products[0].product_name, "Abacaxi");
    }
}
