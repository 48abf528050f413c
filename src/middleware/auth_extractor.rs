// Bearer-token extractor for `/api` routes. Verifies the Supabase access
// token signature (HS256, project JWT secret) and exposes the auth user id
// plus the email claim. The application role lives in `user_profiles` and is
// looked up by handlers that need it.

use actix_web::error::ErrorUnauthorized;
use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use uuid::Uuid;

use crate::models::user::JwtClaims;
use crate::AppState;

pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: Option<String>,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<AuthenticatedUser, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let auth_header = match req.headers().get("Authorization") {
            Some(header) => match header.to_str() {
                Ok(h) => h,
                Err(_) => return ready(Err(ErrorUnauthorized("Invalid header format"))),
            },
            None => return ready(Err(ErrorUnauthorized("Missing Authorization header"))),
        };

        let Some(token) = auth_header.strip_prefix("Bearer ") else {
            return ready(Err(ErrorUnauthorized("Invalid auth header format")));
        };

        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            return ready(Err(ErrorUnauthorized("Auth not configured")));
        };

        match verify_token(token.trim(), &state.supabase.jwt_secret) {
            Ok(claims) => match Uuid::parse_str(&claims.sub) {
                Ok(user_id) => ready(Ok(AuthenticatedUser {
                    user_id,
                    email: claims.email,
                })),
                Err(_) => ready(Err(ErrorUnauthorized("Invalid token subject"))),
            },
            Err(e) => {
                log::debug!("token rejected: {e}");
                ready(Err(ErrorUnauthorized("Invalid token")))
            }
        }
    }
}

fn verify_token(token: &str, secret: &str) -> Result<JwtClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Supabase access tokens are issued for the `authenticated` audience.
    validation.set_audience(&["authenticated"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const TEST_SECRET: &str = "test-secret-key-for-unit-tests";

    fn future_exp() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 3600
    }

    fn make_token(sub: &str, aud: &str, exp: u64) -> String {
        let claims = JwtClaims {
            sub: sub.to_string(),
            aud: Some(aud.to_string()),
            exp: Some(exp),
            iat: None,
            role: Some("authenticated".to_string()),
            email: Some("fulano@mercado.com".to_string()),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn accepts_a_valid_token() {
        let sub = Uuid::new_v4().to_string();
        let token = make_token(&sub, "authenticated", future_exp());
        let claims = verify_token(&token, TEST_SECRET).unwrap();
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.email.as_deref(), Some("fulano@mercado.com"));
    }

    #[test]
    fn rejects_a_bad_signature() {
        let token = make_token(&Uuid::new_v4().to_string(), "authenticated", future_exp());
        assert!(verify_token(&token, "some-other-secret").is_err());
    }

    #[test]
    fn rejects_expired_tokens() {
        let token = make_token(&Uuid::new_v4().to_string(), "authenticated", 1_000);
        assert!(verify_token(&token, TEST_SECRET).is_err());
    }

    #[test]
    fn rejects_a_foreign_audience() {
        let token = make_token(&Uuid::new_v4().to_string(), "something-else", future_exp());
        assert!(verify_token(&token, TEST_SECRET).is_err());
    }
}
