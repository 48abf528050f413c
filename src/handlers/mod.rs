pub mod admin_handlers;
pub mod auth_handlers;
pub mod lookup_handlers;
pub mod product_handlers;
pub mod report_handlers;

use actix_web::HttpResponse;
use log::error;
use uuid::Uuid;

use crate::dtos::ApiResponse;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::repositories::product_repository::ProductScope;
use crate::repositories::user_profile_repo::UserProfileRepository;
use crate::repositories::RepoError;
use crate::services::auth_services::AuthError;

/// Resolves the product visibility scope for a request: regular users are
/// pinned to their own rows, admins may view everyone or a specific user.
pub(crate) async fn resolve_scope(
    profiles: &UserProfileRepository,
    user: &AuthenticatedUser,
    requested: Option<&str>,
) -> Result<ProductScope, RepoError> {
    let role = profiles.role(user.user_id).await?;
    if !role.is_admin() {
        return Ok(ProductScope::Owner(user.user_id));
    }

    Ok(match requested {
        None | Some("all") => ProductScope::AllUsers,
        Some(value) => match Uuid::parse_str(value) {
            Ok(id) => ProductScope::ViewAs(id),
            Err(_) => ProductScope::AllUsers,
        },
    })
}

pub(crate) async fn is_admin(
    profiles: &UserProfileRepository,
    user: &AuthenticatedUser,
) -> Result<bool, RepoError> {
    Ok(profiles.role(user.user_id).await?.is_admin())
}

pub(crate) fn forbidden() -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error("Acesso restrito a administradores"))
}

pub(crate) fn validation_error(errors: Vec<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse {
        status: "error".to_string(),
        message: "Dados inválidos".to_string(),
        data: Some(errors),
    })
}

pub(crate) fn repo_error(context: &str, err: RepoError) -> HttpResponse {
    error!("{context}: {err}");
    match err {
        RepoError::NotFound => {
            HttpResponse::NotFound().json(ApiResponse::error("Registro não encontrado"))
        }
        RepoError::Http(_) | RepoError::Supabase { .. } => HttpResponse::BadGateway()
            .json(ApiResponse::error("Falha ao comunicar com o banco de dados")),
        RepoError::Json(_) => HttpResponse::InternalServerError()
            .json(ApiResponse::error("Resposta inesperada do banco de dados")),
    }
}

pub(crate) fn auth_error(context: &str, err: AuthError) -> HttpResponse {
    match err {
        AuthError::InvalidCredentials => {
            HttpResponse::Unauthorized().json(ApiResponse::error("Email ou senha incorretos"))
        }
        other => {
            error!("{context}: {other}");
            HttpResponse::BadGateway().json(ApiResponse::error(
                "Falha ao comunicar com o serviço de autenticação",
            ))
        }
    }
}
