// Admin-only endpoints. Every handler re-checks the caller's role from
// `user_profiles`; the token alone does not carry the application role.

use actix_web::{delete, get, put, web, HttpResponse};
use chrono::Utc;
use log::info;
use uuid::Uuid;

use crate::dtos::admin_dtos::{SystemStatsOut, UpdateRoleIn};
use crate::dtos::ApiResponse;
use crate::handlers::{forbidden, is_admin, repo_error};
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::repositories::product_repository::{ProductRepository, ProductScope};
use crate::repositories::user_profile_repo::UserProfileRepository;
use crate::services::stats::calculate_stats;

/// GET /api/admin/users — all users with product counts.
#[get("/admin/users")]
pub async fn list_users(
    user: AuthenticatedUser,
    profiles: web::Data<UserProfileRepository>,
) -> HttpResponse {
    match is_admin(&profiles, &user).await {
        Ok(true) => {}
        Ok(false) => return forbidden(),
        Err(e) => return repo_error("check admin", e),
    }

    match profiles.list_with_product_counts().await {
        Ok(users) => HttpResponse::Ok().json(ApiResponse::success("Usuários carregados", users)),
        Err(e) => repo_error("list users", e),
    }
}

/// PUT /api/admin/users/{id}/role — promote or demote a user.
#[put("/admin/users/{id}/role")]
pub async fn update_user_role(
    user: AuthenticatedUser,
    profiles: web::Data<UserProfileRepository>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateRoleIn>,
) -> HttpResponse {
    match is_admin(&profiles, &user).await {
        Ok(true) => {}
        Ok(false) => return forbidden(),
        Err(e) => return repo_error("check admin", e),
    }

    let target = path.into_inner();
    match profiles.set_role(target, body.role).await {
        Ok(()) => {
            info!("role of {target} set to {:?} by {}", body.role, user.user_id);
            HttpResponse::Ok().json(ApiResponse::<()> {
                status: "success".to_string(),
                message: "Função atualizada com sucesso".to_string(),
                data: None,
            })
        }
        Err(e) => repo_error("update role", e),
    }
}

/// GET /api/admin/stats — system-wide totals.
#[get("/admin/stats")]
pub async fn system_stats(
    user: AuthenticatedUser,
    profiles: web::Data<UserProfileRepository>,
    products: web::Data<ProductRepository>,
) -> HttpResponse {
    match is_admin(&profiles, &user).await {
        Ok(true) => {}
        Ok(false) => return forbidden(),
        Err(e) => return repo_error("check admin", e),
    }

    let total_users = match profiles.count().await {
        Ok(count) => count,
        Err(e) => return repo_error("count users", e),
    };

    match products.list(ProductScope::AllUsers).await {
        Ok(all) => {
            let stats = calculate_stats(&all, Utc::now().date_naive());
            HttpResponse::Ok().json(ApiResponse::success(
                "Estatísticas do sistema",
                SystemStatsOut {
                    total_users,
                    total_products: stats.total,
                    total_expired: stats.vencidos,
                    total_expiring: stats.vencendo,
                },
            ))
        }
        Err(e) => repo_error("system stats", e),
    }
}

/// DELETE /api/admin/users/{id} — removes the user's products first, then
/// the profile row (auth user removal cascades backend-side).
#[delete("/admin/users/{id}")]
pub async fn delete_user(
    user: AuthenticatedUser,
    profiles: web::Data<UserProfileRepository>,
    products: web::Data<ProductRepository>,
    path: web::Path<Uuid>,
) -> HttpResponse {
    match is_admin(&profiles, &user).await {
        Ok(true) => {}
        Ok(false) => return forbidden(),
        Err(e) => return repo_error("check admin", e),
    }

    let target = path.into_inner();
    if target == user.user_id {
        return HttpResponse::BadRequest()
            .json(ApiResponse::error("Não é possível excluir a própria conta"));
    }

    if let Err(e) = products.delete_for_user(target).await {
        return repo_error("delete user products", e);
    }
    match profiles.delete(target).await {
        Ok(()) => {
            info!("user {target} deleted by {}", user.user_id);
            HttpResponse::Ok().json(ApiResponse::<()> {
                status: "success".to_string(),
                message: "Usuário deletado com sucesso".to_string(),
                data: None,
            })
        }
        Err(e) => repo_error("delete user", e),
    }
}
