use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::{NaiveDate, Utc};
use log::info;
use uuid::Uuid;

use crate::dtos::product_dtos::{
    BulkDeleteDTO, BulkStatusDTO, CreateProductDTO, CreateProductQuery, ListProductsQuery,
    ProductView, SessionGroupOut, UpdateProductDTO,
};
use crate::dtos::ApiResponse;
use crate::handlers::{repo_error, resolve_scope, validation_error};
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::models::product::{NewProduct, Product};
use crate::repositories::product_repository::ProductRepository;
use crate::repositories::user_profile_repo::UserProfileRepository;
use crate::services::filters::{
    filter_by_days, filter_by_search, filter_by_session, filter_by_status, sort_products,
    SortOrder, SortState,
};
use crate::services::spelling::correct_spelling;
use crate::services::stats::{calculate_stats, group_by_session, stock_insights};

/// Runs the derivation filters and sort over a fetched snapshot.
pub(crate) fn apply_query(
    products: &[Product],
    query: &ListProductsQuery,
    today: NaiveDate,
) -> Vec<Product> {
    let mut filtered = filter_by_search(products, query.search.as_deref().unwrap_or(""));
    if let Some(status) = query.status.as_deref() {
        filtered = filter_by_status(&filtered, status, today);
    }
    if let Some(session) = query.session.as_deref() {
        filtered = filter_by_session(&filtered, session);
    }
    if let Some(days) = query.days.as_deref() {
        filtered = filter_by_days(&filtered, days, today);
    }
    if let Some(field) = query.sort {
        let order = query.order.unwrap_or(SortOrder::Asc);
        sort_products(&mut filtered, SortState { field, order });
    }
    filtered
}

/// GET /api/products
#[get("/products")]
pub async fn list_products(
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
            let views: Vec<ProductView> = apply_query(&all, &query, today)
                .into_iter()
                .map(|p| ProductView::from_product(p, today))
                .collect();
            HttpResponse::Ok().json(ApiResponse::success("Produtos carregados", views))
        }
        Err(e) => repo_error("list products", e),
    }
}

/// GET /api/products/stats
#[get("/products/stats")]
pub async fn product_stats(
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
            let stats = calculate_stats(&all, Utc::now().date_naive());
            HttpResponse::Ok().json(ApiResponse::success("Estatísticas calculadas", stats))
        }
        Err(e) => repo_error("product stats", e),
    }
}

/// GET /api/products/insights
#[get("/products/insights")]
pub async fn product_insights(
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
            let insights = stock_insights(&all, Utc::now().date_naive());
            HttpResponse::Ok().json(ApiResponse::success("Análise calculada", insights))
        }
        Err(e) => repo_error("product insights", e),
    }
}

/// GET /api/products/grouped — products partitioned by session, expiry
/// ascending within each group.
#[get("/products/grouped")]
pub async fn products_grouped(
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
            let groups: Vec<SessionGroupOut> = group_by_session(&filtered)
                .into_iter()
                .map(|(session, products)| SessionGroupOut { session, products })
                .collect();
            HttpResponse::Ok().json(ApiResponse::success("Produtos agrupados", groups))
        }
        Err(e) => repo_error("group products", e),
    }
}

/// GET /api/products/{id}
#[get("/products/{id}")]
pub async fn get_product(
    user: AuthenticatedUser,
    products: web::Data<ProductRepository>,
    profiles: web::Data<UserProfileRepository>,
    path: web::Path<Uuid>,
) -> HttpResponse {
    let scope = match resolve_scope(&profiles, &user, None).await {
        Ok(scope) => scope,
        Err(e) => return repo_error("resolve scope", e),
    };

    match products.get(path.into_inner(), scope).await {
        Ok(product) => {
            let view = ProductView::from_product(product, Utc::now().date_naive());
            HttpResponse::Ok().json(ApiResponse::success("Produto carregado", view))
        }
        Err(e) => repo_error("get product", e),
    }
}

/// POST /api/products
#[post("/products")]
pub async fn create_product(
    user: AuthenticatedUser,
    products: web::Data<ProductRepository>,
    query: web::Query<CreateProductQuery>,
    body: web::Json<CreateProductDTO>,
) -> HttpResponse {
    let dto = body.into_inner();
    let errors = dto.validate();
    if !errors.is_empty() {
        return validation_error(errors);
    }

    let product_name = if query.correct.unwrap_or(false) {
        correct_spelling(dto.product_name.trim())
    } else {
        dto.product_name.trim().to_string()
    };

    let input = NewProduct {
        user_id: user.user_id,
        product_name,
        product_brand: dto.product_brand.trim().to_string(),
        barcode: dto
            .barcode
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty()),
        expiry_date: dto.expiry_date.trim().to_string(),
        quantity: dto.quantity,
        status: dto.status,
    };

    match products.create(&input).await {
        Ok(product) => {
            info!("product {} created by {}", product.id, user.user_id);
            HttpResponse::Created()
                .json(ApiResponse::success("Produto criado com sucesso", product))
        }
        Err(e) => repo_error("create product", e),
    }
}

/// PUT /api/products/{id}
#[put("/products/{id}")]
pub async fn update_product(
    user: AuthenticatedUser,
    products: web::Data<ProductRepository>,
    profiles: web::Data<UserProfileRepository>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductDTO>,
) -> HttpResponse {
    let patch = body.into_inner();
    if patch.is_empty() {
        return HttpResponse::BadRequest().json(ApiResponse::error("Nada para atualizar"));
    }
    let errors = patch.validate();
    if !errors.is_empty() {
        return validation_error(errors);
    }

    let scope = match resolve_scope(&profiles, &user, None).await {
        Ok(scope) => scope,
        Err(e) => return repo_error("resolve scope", e),
    };

    match products.update(path.into_inner(), scope, &patch).await {
        Ok(product) => {
            HttpResponse::Ok().json(ApiResponse::success("Produto atualizado com sucesso", product))
        }
        Err(e) => repo_error("update product", e),
    }
}

/// DELETE /api/products/{id}
#[delete("/products/{id}")]
pub async fn delete_product(
    user: AuthenticatedUser,
    products: web::Data<ProductRepository>,
    profiles: web::Data<UserProfileRepository>,
    path: web::Path<Uuid>,
) -> HttpResponse {
    let scope = match resolve_scope(&profiles, &user, None).await {
        Ok(scope) => scope,
        Err(e) => return repo_error("resolve scope", e),
    };

    match products.delete(path.into_inner(), scope).await {
        Ok(()) => {
            HttpResponse::Ok().json(ApiResponse::<()> {
                status: "success".to_string(),
                message: "Produto deletado com sucesso".to_string(),
                data: None,
            })
        }
        Err(e) => repo_error("delete product", e),
    }
}

/// POST /api/products/bulk-delete — one batched request, all-or-nothing.
#[post("/products/bulk-delete")]
pub async fn bulk_delete(
    user: AuthenticatedUser,
    products: web::Data<ProductRepository>,
    profiles: web::Data<UserProfileRepository>,
    body: web::Json<BulkDeleteDTO>,
) -> HttpResponse {
    if body.ids.is_empty() {
        return HttpResponse::BadRequest().json(ApiResponse::error("Nenhum produto selecionado"));
    }

    let scope = match resolve_scope(&profiles, &user, None).await {
        Ok(scope) => scope,
        Err(e) => return repo_error("resolve scope", e),
    };

    match products.delete_many(&body.ids, scope).await {
        Ok(()) => {
            info!("{} products deleted by {}", body.ids.len(), user.user_id);
            HttpResponse::Ok().json(ApiResponse::success(
                "Produtos deletados com sucesso",
                body.ids.len(),
            ))
        }
        Err(e) => repo_error("bulk delete", e),
    }
}

/// POST /api/products/bulk-status — one batched request, all-or-nothing.
#[post("/products/bulk-status")]
pub async fn bulk_status(
    user: AuthenticatedUser,
    products: web::Data<ProductRepository>,
    profiles: web::Data<UserProfileRepository>,
    body: web::Json<BulkStatusDTO>,
) -> HttpResponse {
    if body.ids.is_empty() {
        return HttpResponse::BadRequest().json(ApiResponse::error("Nenhum produto selecionado"));
    }

    let scope = match resolve_scope(&profiles, &user, None).await {
        Ok(scope) => scope,
        Err(e) => return repo_error("resolve scope", e),
    };

    match products
        .update_status_many(&body.ids, body.status, scope)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::success(
            "Status atualizado com sucesso",
            body.ids.len(),
        )),
        Err(e) => repo_error("bulk status", e),
    }
}
