// GoTrue proxy: signup and password login against the Supabase auth
// endpoints. Profile rows live in `user_profiles` and are handled by the
// repository layer, not here.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SupabaseConfig;
use crate::dtos::auth_dtos::{LoginIn, SessionOut, SignupIn};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("supabase error: {0}")]
    Supabase(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("parse uuid error")]
    UuidError(#[from] uuid::Error),
}

/// Auth user as reported by GoTrue.
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Clone)]
pub struct AuthService {
    client: reqwest::Client,
    supabase_url: String,
    anon_key: String,
}

impl AuthService {
    pub fn new(config: &SupabaseConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            supabase_url: config.url.clone(),
            anon_key: config.anon_key.clone(),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.supabase_url.trim_end_matches('/'), path)
    }

    /// Registers the user with GoTrue and returns the new auth user. Profile
    /// creation is the caller's follow-up step.
    pub async fn signup(&self, input: &SignupIn) -> Result<AuthUser, AuthError> {
        #[derive(Serialize)]
        struct Body<'a> {
            email: &'a str,
            password: &'a str,
        }

        let email = input.email.trim();
        let body = Body {
            email,
            password: &input.password,
        };

        let resp = self
            .client
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(AuthError::Supabase(supabase_error_message(
                &text,
                &format!("signup failed: {status}"),
            )));
        }

        let json_val: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| AuthError::Supabase(format!("invalid json: {e}")))?;

        // GoTrue either nests the user or returns it at the top level,
        // depending on the confirmation settings.
        let user = json_val.get("user").unwrap_or(&json_val);
        let user_id_str = user
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AuthError::Supabase("signup returned no user id".to_string()))?;
        let user_email = user
            .get("email")
            .and_then(|v| v.as_str())
            .unwrap_or(email);

        Ok(AuthUser {
            id: Uuid::parse_str(user_id_str)?,
            email: user_email.to_string(),
        })
    }

    /// Password grant: returns the session and the authenticated user.
    pub async fn login(&self, input: &LoginIn) -> Result<(SessionOut, AuthUser), AuthError> {
        #[derive(Serialize)]
        struct Body<'a> {
            email: &'a str,
            password: &'a str,
        }

        #[derive(Deserialize)]
        struct TokenResp {
            access_token: String,
            refresh_token: Option<String>,
            expires_in: Option<i64>,
            token_type: Option<String>,
            user: Option<UserInfo>,
        }

        #[derive(Deserialize)]
        struct UserInfo {
            id: String,
            email: Option<String>,
        }

        let body = Body {
            email: input.email.trim(),
            password: &input.password,
        };

        let resp = self
            .client
            .post(format!("{}?grant_type=password", self.auth_url("token")))
            .header("apikey", &self.anon_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials);
        }
        if status != StatusCode::OK {
            return Err(AuthError::Supabase(supabase_error_message(
                &text,
                &format!("login failed: {status}"),
            )));
        }

        let tr: TokenResp = serde_json::from_str(&text)
            .map_err(|e| AuthError::Supabase(format!("invalid json in login response: {e}")))?;

        let user = tr
            .user
            .ok_or_else(|| AuthError::Supabase("no user info in login response".to_string()))?;

        let auth_user = AuthUser {
            id: Uuid::parse_str(&user.id)?,
            email: user.email.unwrap_or_default(),
        };

        let session = SessionOut {
            access_token: tr.access_token,
            refresh_token: tr.refresh_token,
            expires_in: tr.expires_in,
            token_type: tr.token_type,
        };

        Ok((session, auth_user))
    }
}

/// GoTrue error bodies carry the message under `msg`, `message` or
/// `error_description` depending on the endpoint.
fn supabase_error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            ["msg", "message", "error_description"]
                .iter()
                .find_map(|key| json.get(key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| format!("{fallback} {body}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_message_from_known_error_keys() {
        assert_eq!(
            supabase_error_message(r#"{"msg":"User already registered"}"#, "signup failed"),
            "User already registered"
        );
        assert_eq!(
            supabase_error_message(r#"{"error_description":"Invalid login"}"#, "login failed"),
            "Invalid login"
        );
        assert!(supabase_error_message("not json", "signup failed").starts_with("signup failed"));
    }
}
