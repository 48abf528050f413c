// Session grouping and aggregate statistics over a product snapshot.

use chrono::{NaiveDate, Weekday};
use serde::Serialize;

use crate::models::product::{Product, ProductStatus};
use crate::services::expiry::{days_until_expiry, parse_expiry, EXPIRING_SOON_WINDOW};

/// Sentinel session for products saved without a department.
pub const NO_SESSION_LABEL: &str = "Sem Sessão";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProductStats {
    pub total: usize,
    pub vencidos: usize,
    pub vencendo: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriticalSession {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    pub normal: usize,
    pub primeira_rebaixa: usize,
    pub segunda_rebaixa: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpiryBreakdown {
    pub expired: usize,
    pub today: usize,
    pub this_week: usize,
    pub this_month: usize,
}

/// Dashboard insight block: status/expiry breakdowns, stock efficiency and
/// the session that needs attention first.
#[derive(Debug, Clone, Serialize)]
pub struct StockInsights {
    pub by_status: StatusBreakdown,
    pub by_expiry: ExpiryBreakdown,
    pub added_this_week: usize,
    pub efficiency: u32,
    pub critical_session: Option<CriticalSession>,
}

fn session_of(product: &Product) -> String {
    if product.product_brand.is_empty() {
        NO_SESSION_LABEL.to_string()
    } else {
        product.product_brand.clone()
    }
}

/// Partitions products by session. Groups appear in first-seen order and keep
/// products in input order, so a caller that pre-sorts by expiry gets
/// expiry-ascending groups.
pub fn group_by_session(products: &[Product]) -> Vec<(String, Vec<Product>)> {
    let mut groups: Vec<(String, Vec<Product>)> = Vec::new();

    for product in products {
        let session = session_of(product);
        match groups.iter_mut().find(|(name, _)| *name == session) {
            Some((_, list)) => list.push(product.clone()),
            None => groups.push((session, vec![product.clone()])),
        }
    }

    groups
}

/// Totals for the dashboard cards. `vencidos` and `vencendo` are disjoint:
/// a product counts in at most one bucket.
pub fn calculate_stats(products: &[Product], today: NaiveDate) -> ProductStats {
    let mut stats = ProductStats {
        total: products.len(),
        vencidos: 0,
        vencendo: 0,
    };

    for product in products {
        let days = days_until_expiry(&product.expiry_date, today);
        if days < 0 {
            stats.vencidos += 1;
        } else if days <= EXPIRING_SOON_WINDOW {
            stats.vencendo += 1;
        }
    }

    stats
}

/// Share of products still at the `normal` stage, as a rounded percentage.
/// Zero when there is nothing in stock.
pub fn stock_efficiency(products: &[Product]) -> u32 {
    if products.is_empty() {
        return 0;
    }
    let normal = products
        .iter()
        .filter(|p| p.status == ProductStatus::Normal)
        .count();
    ((normal as f64 / products.len() as f64) * 100.0).round() as u32
}

/// Session holding the most products due within a week (expired included).
/// Ties resolve to the lexicographically smallest session name.
pub fn critical_session(products: &[Product], today: NaiveDate) -> Option<CriticalSession> {
    let mut counts: Vec<(String, usize)> = Vec::new();

    for product in products {
        let days = days_until_expiry(&product.expiry_date, today);
        if days > EXPIRING_SOON_WINDOW {
            continue;
        }
        let session = session_of(product);
        match counts.iter_mut().find(|(name, _)| *name == session) {
            Some((_, count)) => *count += 1,
            None => counts.push((session, 1)),
        }
    }

    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(name, count)| CriticalSession { name, count })
}

pub fn stock_insights(products: &[Product], today: NaiveDate) -> StockInsights {
    let mut by_status = StatusBreakdown {
        normal: 0,
        primeira_rebaixa: 0,
        segunda_rebaixa: 0,
    };
    let mut by_expiry = ExpiryBreakdown {
        expired: 0,
        today: 0,
        this_week: 0,
        this_month: 0,
    };

    let week = today.week(Weekday::Sun);
    let mut added_this_week = 0;

    for product in products {
        match product.status {
            ProductStatus::Normal => by_status.normal += 1,
            ProductStatus::PrimeiraRebaixa => by_status.primeira_rebaixa += 1,
            ProductStatus::SegundaRebaixa => by_status.segunda_rebaixa += 1,
        }

        let days = days_until_expiry(&product.expiry_date, today);
        if days < 0 {
            by_expiry.expired += 1;
        } else if days == 0 {
            by_expiry.today += 1;
        } else if days <= 7 {
            by_expiry.this_week += 1;
        } else if days <= 30 {
            by_expiry.this_month += 1;
        }

        let created = product
            .created_at
            .as_deref()
            .and_then(parse_expiry);
        if created.is_some_and(|d| (week.first_day()..=week.last_day()).contains(&d)) {
            added_this_week += 1;
        }
    }

    StockInsights {
        by_status,
        by_expiry,
        added_this_week,
        efficiency: stock_efficiency(products),
        critical_session: critical_session(products, today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn product(name: &str, brand: &str, expiry: &str, status: ProductStatus) -> Product {
        Product {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            product_name: name.to_string(),
            product_brand: brand.to_string(),
            barcode: None,
            expiry_date: expiry.to_string(),
            quantity: 1,
            status,
            created_at: None,
            updated_at: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn grouping_partitions_without_loss() {
        let products = vec![
            product("Leite", "Laticínios & Danones", "2024-01-12", ProductStatus::Normal),
            product("Arroz", "Farináceos & Leites", "2024-02-01", ProductStatus::Normal),
            product("Queijo", "Laticínios & Danones", "2024-01-15", ProductStatus::Normal),
            product("Avulso", "", "2024-01-20", ProductStatus::Normal),
        ];

        let groups = group_by_session(&products);
        let total: usize = groups.iter().map(|(_, list)| list.len()).sum();
        assert_eq!(total, products.len());

        let names: Vec<_> = groups.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Laticínios & Danones", "Farináceos & Leites", NO_SESSION_LABEL]
        );
        // Within a group, input order is preserved.
        assert_eq!(groups[0].1[0].product_name, "Leite");
        assert_eq!(groups[0].1[1].product_name, "Queijo");
    }

    #[test]
    fn stats_buckets_are_disjoint() {
        let products = vec![
            product("Vencido", "S", "2024-01-01", ProductStatus::Normal),
            product("Vencendo", "S", "2024-01-15", ProductStatus::Normal),
            product("Ok", "S", "2024-03-01", ProductStatus::Normal),
        ];
        let stats = calculate_stats(&products, today());
        assert_eq!(stats, ProductStats { total: 3, vencidos: 1, vencendo: 1 });
        assert!(stats.vencidos + stats.vencendo <= products.len());
    }

    #[test]
    fn stats_on_empty_input_are_zero() {
        let stats = calculate_stats(&[], today());
        assert_eq!(stats, ProductStats { total: 0, vencidos: 0, vencendo: 0 });
    }

    #[test]
    fn spec_scenario_expired_milk() {
        let products = vec![product(
            "Leite",
            "Laticínios",
            "2024-01-01",
            ProductStatus::Normal,
        )];
        let stats = calculate_stats(&products, today());
        assert_eq!(days_until_expiry("2024-01-01", today()), -9);
        assert_eq!(stats, ProductStats { total: 1, vencidos: 1, vencendo: 0 });
    }

    #[test]
    fn efficiency_handles_empty_and_rounds() {
        assert_eq!(stock_efficiency(&[]), 0);

        let products = vec![
            product("A", "S", "2024-03-01", ProductStatus::Normal),
            product("B", "S", "2024-03-01", ProductStatus::Normal),
            product("C", "S", "2024-03-01", ProductStatus::PrimeiraRebaixa),
        ];
        // 2/3 => 66.66..% rounds to 67.
        assert_eq!(stock_efficiency(&products), 67);
    }

    #[test]
    fn critical_session_counts_week_window() {
        let products = vec![
            product("A", "Limpeza", "2024-01-08", ProductStatus::Normal),
            product("B", "Limpeza", "2024-01-12", ProductStatus::Normal),
            product("C", "Bebidas", "2024-01-11", ProductStatus::Normal),
            product("D", "Bebidas", "2024-05-01", ProductStatus::Normal),
        ];
        let critical = critical_session(&products, today()).unwrap();
        assert_eq!(critical.name, "Limpeza");
        assert_eq!(critical.count, 2);
    }

    #[test]
    fn critical_session_tie_breaks_lexicographically() {
        let products = vec![
            product("A", "Limpeza", "2024-01-12", ProductStatus::Normal),
            product("B", "Bebidas", "2024-01-11", ProductStatus::Normal),
        ];
        let critical = critical_session(&products, today()).unwrap();
        assert_eq!(critical.name, "Bebidas");
        assert_eq!(critical.count, 1);
    }

    #[test]
    fn critical_session_none_when_nothing_due() {
        let products = vec![product("A", "S", "2024-06-01", ProductStatus::Normal)];
        assert!(critical_session(&products, today()).is_none());
    }

    #[test]
    fn insights_breakdowns() {
        let mut due_today = product("Hoje", "S", "2024-01-10", ProductStatus::Normal);
        due_today.created_at = Some("2024-01-09T10:00:00+00:00".to_string());

        let products = vec![
            product("Vencido", "S", "2024-01-05", ProductStatus::SegundaRebaixa),
            due_today,
            product("Semana", "S", "2024-01-14", ProductStatus::PrimeiraRebaixa),
            product("Mês", "S", "2024-02-05", ProductStatus::Normal),
            product("Longe", "S", "2024-06-01", ProductStatus::Normal),
        ];

        let insights = stock_insights(&products, today());
        assert_eq!(
            insights.by_expiry,
            ExpiryBreakdown { expired: 1, today: 1, this_week: 1, this_month: 1 }
        );
        assert_eq!(
            insights.by_status,
            StatusBreakdown { normal: 3, primeira_rebaixa: 1, segunda_rebaixa: 1 }
        );
        // 2024-01-10 is a Wednesday; the week of Jan 7-13 contains Jan 9.
        assert_eq!(insights.added_this_week, 1);
        assert_eq!(insights.efficiency, 60);
    }
}
