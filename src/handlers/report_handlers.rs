use actix_web::{get, web, HttpResponse};
use chrono::Utc;

use crate::dtos::product_dtos::ListProductsQuery;
use crate::dtos::ApiResponse;
use crate::handlers::product_handlers::apply_query;
use crate::handlers::{repo_error, resolve_scope};
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::repositories::product_repository::ProductRepository;
use crate::repositories::user_profile_repo::UserProfileRepository;
use crate::services::reports::{csv_file_name, export_csv, priority_report, standard_report};

/// GET /api/reports/csv — spreadsheet download. Accepts the same filter
/// parameters as the product listing, so a filtered view exports as seen.
#[get("/reports/csv")]
pub async fn export_products_csv(
    user: AuthenticatedUser,
    products: web::Data<ProductRepository>,
    profiles: web::Data<UserProfileRepository>,
    query: web::Query<ListProductsQuery>,
) -> HttpResponse {
    let scope = match resolve_scope(&profiles, &user, query.user_id.as_deref()).await {
        Ok(scope) => scope,
        Err(e) => return repo_error("resolve scope", e),
    };

    match products.list(scope).await {
        Ok(all) => {
            let today = Utc::now().date_naive();
            let filtered = apply_query(&all, &query, today);
            let csv = export_csv(&filtered, today);
            HttpResponse::Ok()
                .content_type(mime::TEXT_CSV_UTF_8)
                .insert_header((
                    "Content-Disposition",
                    format!("attachment; filename=\"{}\"", csv_file_name(today)),
                ))
                .body(csv)
        }
        Err(e) => repo_error("export csv", e),
    }
}

/// GET /api/reports/standard — per-session control sheet document model.
#[get("/reports/standard")]
pub async fn standard_report_doc(
    user: AuthenticatedUser,
    products: web::Data<ProductRepository>,
    profiles: web::Data<UserProfileRepository>,
    query: web::Query<ListProductsQuery>,
) -> HttpResponse {
    let scope = match resolve_scope(&profiles, &user, query.user_id.as_deref()).await {
        Ok(scope) => scope,
        Err(e) => return repo_error("resolve scope", e),
    };

    match products.list(scope).await {
        Ok(all) => {
            let now = Utc::now().naive_utc();
            let filtered = apply_query(&all, &query, now.date());
            let report = standard_report(&filtered, now);
            HttpResponse::Ok().json(ApiResponse::success("Relatório gerado", report))
        }
        Err(e) => repo_error("standard report", e),
    }
}

/// GET /api/reports/priority — priority action report document model.
#[get("/reports/priority")]
pub async fn priority_report_doc(
    user: AuthenticatedUser,
    products: web::Data<ProductRepository>,
    profiles: web::Data<UserProfileRepository>,
    query: web::Query<ListProductsQuery>,
) -> HttpResponse {
    let scope = match resolve_scope(&profiles, &user, query.user_id.as_deref()).await {
        Ok(scope) => scope,
        Err(e) => return repo_error("resolve scope", e),
    };

    match products.list(scope).await {
        Ok(all) => {
            let now = Utc::now().naive_utc();
            let filtered = apply_query(&all, &query, now.date());
            let report = priority_report(&filtered, now);
            HttpResponse::Ok().json(ApiResponse::success("Relatório gerado", report))
        }
        Err(e) => repo_error("priority report", e),
    }
}
