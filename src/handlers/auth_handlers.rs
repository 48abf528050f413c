use actix_web::{get, post, web, HttpResponse};
use log::{info, warn};

use crate::dtos::auth_dtos::{AuthOut, LoginIn, SignupIn};
use crate::dtos::ApiResponse;
use crate::handlers::{auth_error, repo_error, validation_error};
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::repositories::user_profile_repo::UserProfileRepository;
use crate::services::auth_services::AuthService;

/// POST /auth/signup
#[post("/signup")]
pub async fn signup(
    auth: web::Data<AuthService>,
    profiles: web::Data<UserProfileRepository>,
    body: web::Json<SignupIn>,
) -> HttpResponse {
    let errors = body.validate();
    if !errors.is_empty() {
        return validation_error(errors);
    }

    let user = match auth.signup(&body).await {
        Ok(user) => user,
        Err(e) => return auth_error("signup", e),
    };

    // Missing profile rows are retried lazily on first login, so a failure
    // here only gets logged.
    if let Err(e) = profiles.ensure_exists(user.id, &user.email).await {
        warn!("could not create profile for {}: {e}", user.id);
    }

    info!("new signup {}", user.id);
    HttpResponse::Created().json(ApiResponse::success(
        "Cadastro realizado com sucesso",
        AuthOut {
            user,
            session: None,
        },
    ))
}

/// POST /auth/login
#[post("/login")]
pub async fn login(
    auth: web::Data<AuthService>,
    profiles: web::Data<UserProfileRepository>,
    body: web::Json<LoginIn>,
) -> HttpResponse {
    let errors = body.validate();
    if !errors.is_empty() {
        return validation_error(errors);
    }

    match auth.login(&body).await {
        Ok((session, user)) => {
            if let Err(e) = profiles.ensure_exists(user.id, &user.email).await {
                warn!("could not ensure profile for {}: {e}", user.id);
            }
            HttpResponse::Ok().json(ApiResponse::success(
                "Login realizado com sucesso",
                AuthOut {
                    user,
                    session: Some(session),
                },
            ))
        }
        Err(e) => auth_error("login", e),
    }
}

/// GET /api/profile — the caller's own profile row.
#[get("/profile")]
pub async fn get_current_profile(
    user: AuthenticatedUser,
    profiles: web::Data<UserProfileRepository>,
) -> HttpResponse {
    let result = match &user.email {
        // With the email claim in hand we can create the row on demand.
        Some(email) => profiles
            .ensure_exists(user.user_id, email)
            .await
            .map(Some),
        None => profiles.fetch(user.user_id).await,
    };

    match result {
        Ok(Some(profile)) => {
            HttpResponse::Ok().json(ApiResponse::success("Perfil carregado", profile))
        }
        Ok(None) => HttpResponse::NotFound().json(ApiResponse::error("Perfil não encontrado")),
        Err(e) => repo_error("get profile", e),
    }
}
