// Report compiler: classifies products by urgency and assembles the two
// export documents (per-session control sheet and the priority action
// report) plus the CSV flat file. Output stops at an ordered document model;
// page layout belongs to the rendering sink.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::models::product::Product;
use crate::services::expiry::{days_until_expiry, format_expiry_date, format_expiry_short};
use crate::services::filters::{sort_products, SortField, SortState};
use crate::services::stats::group_by_session;

pub const CSV_HEADER: &str =
    "Sessão,Produto,Código de Barras,Validade,Dias Restantes,Quantidade,Status";

/// Placeholder for products without a barcode in report tables.
const NO_BARCODE: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    Warning,
    Ok,
}

/// Product annotated with its computed urgency. `priority` drives grouping;
/// `priority_label` carries the display text (two distinct labels map to
/// `Critical`: already expired vs. due within a week).
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithPriority {
    #[serde(flatten)]
    pub product: Product,
    pub days_remaining: i64,
    pub priority: Priority,
    pub priority_label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriorityGroups {
    pub critical: Vec<ProductWithPriority>,
    pub warning: Vec<ProductWithPriority>,
    pub ok: Vec<ProductWithPriority>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSection {
    pub title: String,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

/// Ordered document handed to the rendering sink: summary lines, one table
/// per section, footer lines. `file_name` embeds the export date and no
/// randomness, so same-day exports collide by design.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    pub title: String,
    pub generated_at: String,
    pub file_name: String,
    pub summary: Vec<String>,
    pub sections: Vec<ReportSection>,
    pub footer: Vec<String>,
}

pub fn classify(products: &[Product], today: NaiveDate) -> Vec<ProductWithPriority> {
    products
        .iter()
        .map(|p| {
            let days = days_until_expiry(&p.expiry_date, today);
            let (priority, priority_label) = if days < 0 {
                (Priority::Critical, "🔴 VENCIDO")
            } else if days <= 7 {
                (Priority::Critical, "🔴 CRÍTICO")
            } else if days <= 15 {
                (Priority::Warning, "🟡 ATENÇÃO")
            } else {
                (Priority::Ok, "🟢 OK")
            };

            ProductWithPriority {
                product: p.clone(),
                days_remaining: days,
                priority,
                priority_label,
            }
        })
        .collect()
}

/// Splits classified products into the three priority buckets, each sorted
/// ascending by days remaining.
pub fn group_by_priority(classified: Vec<ProductWithPriority>) -> PriorityGroups {
    let mut groups = PriorityGroups {
        critical: Vec::new(),
        warning: Vec::new(),
        ok: Vec::new(),
    };

    for item in classified {
        match item.priority {
            Priority::Critical => groups.critical.push(item),
            Priority::Warning => groups.warning.push(item),
            Priority::Ok => groups.ok.push(item),
        }
    }

    groups.critical.sort_by_key(|p| p.days_remaining);
    groups.warning.sort_by_key(|p| p.days_remaining);
    groups.ok.sort_by_key(|p| p.days_remaining);
    groups
}

fn days_cell(days: i64) -> String {
    if days < 0 {
        "X".to_string()
    } else {
        days.to_string()
    }
}

fn barcode_cell(product: &Product) -> String {
    product
        .barcode
        .clone()
        .unwrap_or_else(|| NO_BARCODE.to_string())
}

/// Per-session control sheet: one table per session, expiry-ascending within
/// each, with blank price/action/responsible columns to fill in on paper.
pub fn standard_report(products: &[Product], now: NaiveDateTime) -> ReportDocument {
    let today = now.date();

    let mut sorted = products.to_vec();
    sort_products(&mut sorted, SortState::new(SortField::Date));

    let sections = group_by_session(&sorted)
        .into_iter()
        .map(|(session, items)| {
            let rows = items
                .iter()
                .map(|p| {
                    let days = days_until_expiry(&p.expiry_date, today);
                    vec![
                        barcode_cell(p),
                        p.product_name.clone(),
                        format_expiry_short(&p.expiry_date),
                        days_cell(days),
                        p.quantity.to_string(),
                        "______".to_string(),
                        "______".to_string(),
                        "______".to_string(),
                    ]
                })
                .collect();

            ReportSection {
                title: session.to_uppercase(),
                columns: vec!["Cód.", "Produto", "Val.", "Dias", "Qtd", "Preço", "Ação", "Resp."],
                rows,
            }
        })
        .collect();

    ReportDocument {
        title: "Controle de Validades".to_string(),
        generated_at: now.format("%d/%m/%Y %H:%M").to_string(),
        file_name: format!("validades-{}.pdf", today.format("%d-%m-%Y")),
        summary: Vec::new(),
        sections,
        footer: vec![
            format!("Total: {} produtos", products.len()),
            "Fiscal: ____________".to_string(),
            "Supervisor: ____________".to_string(),
            "___/___/___".to_string(),
        ],
    }
}

/// Priority action report: executive summary, one section per priority bucket
/// (the critical one tracks actions), and the fixed follow-up checklist.
pub fn priority_report(products: &[Product], now: NaiveDateTime) -> ReportDocument {
    let today = now.date();
    let groups = group_by_priority(classify(products, today));

    let summary = vec![
        format!("Total de Produtos: {}", products.len()),
        format!("🔴 CRÍTICO (0-7 dias): {}", groups.critical.len()),
        format!("🟡 ATENÇÃO (8-15 dias): {}", groups.warning.len()),
        format!("🟢 OK (+15 dias): {}", groups.ok.len()),
    ];

    let mut sections = Vec::new();
    if !groups.critical.is_empty() {
        sections.push(priority_section("🔴 CRÍTICO - AÇÃO IMEDIATA", &groups.critical, true));
    }
    if !groups.warning.is_empty() {
        sections.push(priority_section("🟡 ATENÇÃO - MONITORAR", &groups.warning, false));
    }
    if !groups.ok.is_empty() {
        sections.push(priority_section("🟢 OK - ESTOQUE NORMAL", &groups.ok, false));
    }

    ReportDocument {
        title: "RELATÓRIO DE VALIDADES - PRIORITÁRIO".to_string(),
        generated_at: format!("Emitido em: {}", now.format("%d/%m/%Y %H:%M")),
        file_name: format!("relatorio-validades-{}.pdf", today.format("%d-%m-%Y")),
        summary,
        sections,
        footer: vec![
            "✍️ AÇÕES TOMADAS (preencher e devolver)".to_string(),
            "☐ Rebaixa aplicada    Data: ___/___/___".to_string(),
            "☐ Produto retirado    Resp: _______________".to_string(),
            "☐ Transferido filial    Local: _______________".to_string(),
            "☐ Doação realizada".to_string(),
            "☐ Descarte".to_string(),
            "Observações: ________________________________".to_string(),
            "Conferido por: ____________________    Data: ___/___/___".to_string(),
            "Supervisor: ____________________    Fiscal: ____________________".to_string(),
        ],
    }
}

fn priority_section(title: &str, items: &[ProductWithPriority], with_action: bool) -> ReportSection {
    let mut columns = vec!["Cód.", "Produto", "Sessão", "Val.", "Dias", "Qtd"];
    if with_action {
        columns.extend(["Ação", "Resp."]);
    }

    let rows = items
        .iter()
        .map(|item| {
            let p = &item.product;
            let mut row = vec![
                barcode_cell(p),
                p.product_name.clone(),
                p.product_brand.clone(),
                format_expiry_short(&p.expiry_date),
                days_cell(item.days_remaining),
                p.quantity.to_string(),
            ];
            if with_action {
                row.push("☐ ___".to_string());
                row.push("___".to_string());
            }
            row
        })
        .collect();

    ReportSection {
        title: title.to_string(),
        columns,
        rows,
    }
}

/// Flat CSV for spreadsheets: fixed header, one quoted row per product,
/// UTF-8 byte-order mark so Excel picks up the encoding.
pub fn export_csv(products: &[Product], today: NaiveDate) -> String {
    let mut lines = Vec::with_capacity(products.len() + 1);
    lines.push(CSV_HEADER.to_string());

    for p in products {
        let fields = [
            p.product_brand.clone(),
            p.product_name.clone(),
            p.barcode.clone().unwrap_or_else(|| "-".to_string()),
            format_expiry_date(&p.expiry_date),
            days_until_expiry(&p.expiry_date, today).to_string(),
            p.quantity.to_string(),
            p.status.label().to_string(),
        ];
        let row = fields
            .iter()
            .map(|field| quote_csv(field))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(row);
    }

    format!("\u{feff}{}", lines.join("\n"))
}

fn quote_csv(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

pub fn csv_file_name(today: NaiveDate) -> String {
    format!("validades-{}.csv", today.format("%d-%m-%Y"))
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

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    fn today() -> NaiveDate {
        now().date()
    }

    #[test]
    fn classification_boundaries() {
        let cases = [
            ("2024-01-09", Priority::Critical, "🔴 VENCIDO"),
            ("2024-01-10", Priority::Critical, "🔴 CRÍTICO"),
            ("2024-01-17", Priority::Critical, "🔴 CRÍTICO"),
            ("2024-01-18", Priority::Warning, "🟡 ATENÇÃO"),
            ("2024-01-25", Priority::Warning, "🟡 ATENÇÃO"),
            ("2024-01-26", Priority::Ok, "🟢 OK"),
        ];

        for (expiry, priority, label) in cases {
            let products = vec![product("P", "S", None, expiry, 1, ProductStatus::Normal)];
            let classified = classify(&products, today());
            assert_eq!(classified[0].priority, priority, "expiry {expiry}");
            assert_eq!(classified[0].priority_label, label, "expiry {expiry}");
        }
    }

    #[test]
    fn priority_groups_sort_ascending_by_days() {
        let products = vec![
            product("B", "S", None, "2024-01-14", 1, ProductStatus::Normal),
            product("A", "S", None, "2024-01-05", 1, ProductStatus::Normal),
            product("C", "S", None, "2024-01-11", 1, ProductStatus::Normal),
        ];
        let groups = group_by_priority(classify(&products, today()));
        let days: Vec<_> = groups.critical.iter().map(|p| p.days_remaining).collect();
        assert_eq!(days, vec![-5, 1, 4]);
        assert!(groups.warning.is_empty());
        assert!(groups.ok.is_empty());
    }

    #[test]
    fn standard_report_groups_by_session_expiry_ascending() {
        let products = vec![
            product("Queijo", "Laticínios & Danones", Some("789100"), "2024-01-20", 1, ProductStatus::Normal),
            product("Leite", "Laticínios & Danones", None, "2024-01-05", 2, ProductStatus::Normal),
            product("Sabão", "Limpeza", None, "2024-02-01", 4, ProductStatus::Normal),
        ];

        let report = standard_report(&products, now());
        assert_eq!(report.title, "Controle de Validades");
        assert_eq!(report.file_name, "validades-10-01-2024.pdf");
        assert_eq!(report.sections.len(), 2);

        let first = &report.sections[0];
        assert_eq!(first.title, "LATICÍNIOS & DANONES");
        // Expired milk sorts before the cheese and renders "X" for days.
        assert_eq!(first.rows[0][1], "Leite");
        assert_eq!(first.rows[0][0], "—");
        assert_eq!(first.rows[0][2], "05/01");
        assert_eq!(first.rows[0][3], "X");
        assert_eq!(first.rows[1][1], "Queijo");
        assert_eq!(first.rows[1][3], "10");

        assert_eq!(report.footer[0], "Total: 3 produtos");
    }

    #[test]
    fn priority_report_summary_and_action_columns() {
        let products = vec![
            product("Vencido", "S", None, "2024-01-05", 1, ProductStatus::Normal),
            product("Atenção", "S", None, "2024-01-20", 1, ProductStatus::Normal),
            product("Ok", "S", None, "2024-03-01", 1, ProductStatus::Normal),
        ];

        let report = priority_report(&products, now());
        assert_eq!(report.file_name, "relatorio-validades-10-01-2024.pdf");
        assert_eq!(
            report.summary,
            vec![
                "Total de Produtos: 3",
                "🔴 CRÍTICO (0-7 dias): 1",
                "🟡 ATENÇÃO (8-15 dias): 1",
                "🟢 OK (+15 dias): 1",
            ]
        );

        assert_eq!(report.sections.len(), 3);
        let critical = &report.sections[0];
        assert_eq!(critical.columns.len(), 8);
        assert_eq!(critical.rows[0].len(), 8);
        assert_eq!(critical.rows[0][6], "☐ ___");

        let warning = &report.sections[1];
        assert_eq!(warning.columns.len(), 6);
        assert_eq!(warning.rows[0].len(), 6);
    }

    #[test]
    fn priority_report_skips_empty_sections() {
        let products = vec![product("Ok", "S", None, "2024-06-01", 1, ProductStatus::Normal)];
        let report = priority_report(&products, now());
        assert_eq!(report.sections.len(), 1);
        assert_eq!(report.sections[0].title, "🟢 OK - ESTOQUE NORMAL");
    }

    #[test]
    fn csv_has_header_and_quoted_rows() {
        let products = vec![
            product("Leite", "Laticínios", Some("7891000100103"), "2024-01-05", 2, ProductStatus::Normal),
            product("Arroz", "Farináceos", None, "2024-02-05", 1, ProductStatus::PrimeiraRebaixa),
        ];

        let csv = export_csv(&products, today());
        assert!(csv.starts_with('\u{feff}'));

        let body = csv.trim_start_matches('\u{feff}');
        let lines: Vec<_> = body.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "\"Laticínios\",\"Leite\",\"7891000100103\",\"05/01/2024\",\"-5\",\"2\",\"Normal\""
        );
        assert_eq!(
            lines[2],
            "\"Farináceos\",\"Arroz\",\"-\",\"05/02/2024\",\"26\",\"1\",\"Rebaixa 1\""
        );
    }

    #[test]
    fn csv_escapes_embedded_quotes() {
        let products = vec![product(
            "Suco \"Natural\"",
            "Bebidas",
            None,
            "2024-02-01",
            1,
            ProductStatus::Normal,
        )];
        let csv = export_csv(&products, today());
        assert!(csv.contains("\"Suco \"\"Natural\"\"\""));
    }

    #[test]
    fn file_names_embed_the_export_date() {
        assert_eq!(csv_file_name(today()), "validades-10-01-2024.csv");
    }
}
