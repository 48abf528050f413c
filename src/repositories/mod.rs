pub mod product_repository;
pub mod user_profile_repo;

use thiserror::Error;

/// Failures talking to the Supabase REST layer. Callers surface these as a
/// transient notification and abort the operation; nothing here is retried.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("supabase error {status}: {body}")]
    Supabase {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not found")]
    NotFound,
}

/// Checks the PostgREST response status and hands back the body text.
pub(crate) async fn expect_success(resp: reqwest::Response) -> Result<String, RepoError> {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(RepoError::Supabase { status, body });
    }
    Ok(body)
}
