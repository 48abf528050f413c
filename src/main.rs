mod config;
mod dtos;
mod handlers;
mod middleware;
mod models;
mod repositories;
mod services;

use std::env;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;
use reqwest::Client;

use crate::config::SupabaseConfig;
use crate::handlers::admin_handlers::{delete_user, list_users, system_stats, update_user_role};
use crate::handlers::auth_handlers::{get_current_profile, login, signup};
use crate::handlers::lookup_handlers::{
    correct_product_name, list_sessions, lookup_barcode, scan_expiry_date, suggest_session,
};
use crate::handlers::product_handlers::{
    bulk_delete, bulk_status, create_product, delete_product, get_product, list_products,
    product_insights, product_stats, products_grouped, update_product,
};
use crate::handlers::report_handlers::{
    export_products_csv, priority_report_doc, standard_report_doc,
};
use crate::repositories::product_repository::ProductRepository;
use crate::repositories::user_profile_repo::UserProfileRepository;
use crate::services::auth_services::AuthService;
use crate::services::lookup::LookupService;
use crate::services::suggestions::SuggestionService;

fn mask_key(k: &str) -> String {
    if k.len() <= 8 {
        "[REDACTED]".to_string()
    } else {
        format!("{}***{}", &k[..4], &k[k.len() - 4..])
    }
}

#[derive(Clone)]
pub struct AppState {
    pub supabase: SupabaseConfig,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    dotenv::dotenv().ok();

    let supabase = match SupabaseConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("configuration error: {e:#}");
            std::process::exit(1);
        }
    };

    info!("Supabase URL: {}", supabase.url);
    info!("Supabase key: {}", mask_key(&supabase.service_role_key));

    let http_client = Client::builder()
        .user_agent("bobo-validades-be/0.1")
        .build()
        .expect("failed to build http client");

    let auth_data = web::Data::new(AuthService::new(&supabase, http_client.clone()));
    let products_data = web::Data::new(ProductRepository::new(&supabase, http_client.clone()));
    let profiles_data = web::Data::new(UserProfileRepository::new(&supabase, http_client.clone()));
    let lookup_data = web::Data::new(LookupService::new(http_client.clone()));
    let suggest_data = web::Data::new(SuggestionService::new(&supabase, http_client.clone()));
    let state = web::Data::new(AppState { supabase });

    let allowed_origins = env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".into());

    let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_address = format!("0.0.0.0:{port}");

    info!("Starting server on {bind_address}");

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                "authorization",
                "content-type",
                "accept",
                "x-requested-with",
            ])
            .supports_credentials()
            .max_age(3600);

        for origin in allowed_origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
        {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .app_data(auth_data.clone())
            .app_data(products_data.clone())
            .app_data(profiles_data.clone())
            .app_data(lookup_data.clone())
            .app_data(suggest_data.clone())
            .service(
                web::scope("/auth")
                    .service(signup) // POST /auth/signup
                    .service(login), // POST /auth/login
            )
            .service(
                web::scope("/api")
                    .service(get_current_profile) // GET /api/profile
                    // Fixed product routes must land before /products/{id}.
                    .service(product_stats) // GET /api/products/stats
                    .service(product_insights) // GET /api/products/insights
                    .service(products_grouped) // GET /api/products/grouped
                    .service(bulk_delete) // POST /api/products/bulk-delete
                    .service(bulk_status) // POST /api/products/bulk-status
                    .service(list_products) // GET /api/products
                    .service(create_product) // POST /api/products
                    .service(get_product) // GET /api/products/{id}
                    .service(update_product) // PUT /api/products/{id}
                    .service(delete_product) // DELETE /api/products/{id}
                    .service(export_products_csv) // GET /api/reports/csv
                    .service(standard_report_doc) // GET /api/reports/standard
                    .service(priority_report_doc) // GET /api/reports/priority
                    .service(lookup_barcode) // GET /api/lookup/barcode/{barcode}
                    .service(list_sessions) // GET /api/sessions
                    .service(suggest_session) // POST /api/suggest-session
                    .service(scan_expiry_date) // POST /api/scan/expiry-date
                    .service(correct_product_name) // POST /api/spelling/correct
                    .service(list_users) // GET /api/admin/users
                    .service(update_user_role) // PUT /api/admin/users/{id}/role
                    .service(system_stats) // GET /api/admin/stats
                    .service(delete_user), // DELETE /api/admin/users/{id}
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
