// Wrapper over the `user_profiles` table and the `get_users_with_products`
// RPC. Profile rows mirror auth users; `ensure_exists` upserts on first
// contact so older accounts get a row lazily.

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::config::SupabaseConfig;
use crate::models::user::{UserProfile, UserRole};
use crate::repositories::{expect_success, RepoError};

#[derive(Clone)]
pub struct UserProfileRepository {
    client: Client,
    supabase_url: String,
    service_key: String,
}

impl UserProfileRepository {
    pub fn new(config: &SupabaseConfig, client: Client) -> Self {
        Self {
            client,
            supabase_url: config.url.clone(),
            service_key: config.service_role_key.clone(),
        }
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.supabase_url.trim_end_matches('/'), path)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", &self.service_key))
    }

    pub async fn fetch(&self, user_id: Uuid) -> Result<Option<UserProfile>, RepoError> {
        let url = format!("{}?id=eq.{user_id}&select=*", self.rest_url("user_profiles"));
        let resp = self.authed(self.client.get(&url)).send().await?;
        let body = expect_success(resp).await?;
        let profiles: Vec<UserProfile> = serde_json::from_str(&body)?;
        Ok(profiles.into_iter().next())
    }

    /// Role of the user, defaulting to `user` when no profile row exists yet.
    pub async fn role(&self, user_id: Uuid) -> Result<UserRole, RepoError> {
        Ok(self
            .fetch(user_id)
            .await?
            .map(|p| p.role)
            .unwrap_or(UserRole::User))
    }

    /// Upserts the profile row for an auth user. New rows start as `user`;
    /// an existing row keeps its role and just refreshes the email.
    pub async fn ensure_exists(&self, user_id: Uuid, email: &str) -> Result<UserProfile, RepoError> {
        if let Some(existing) = self.fetch(user_id).await? {
            return Ok(existing);
        }

        let payload = json!({
            "id": user_id,
            "email": email,
            "role": UserRole::User,
        });

        let resp = self
            .authed(self.client.post(self.rest_url("user_profiles")))
            .header("Content-Type", "application/json")
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&payload)
            .send()
            .await?;

        let body = expect_success(resp).await?;
        let profiles: Vec<UserProfile> = serde_json::from_str(&body)?;
        profiles.into_iter().next().ok_or(RepoError::NotFound)
    }

    pub async fn set_role(&self, user_id: Uuid, role: UserRole) -> Result<(), RepoError> {
        let url = format!("{}?id=eq.{user_id}", self.rest_url("user_profiles"));
        let payload = json!({
            "role": role,
            "updated_at": Utc::now().to_rfc3339(),
        });

        let resp = self
            .authed(self.client.patch(&url))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=minimal")
            .json(&payload)
            .send()
            .await?;

        expect_success(resp).await?;
        Ok(())
    }

    /// All users with their product counts, via the reporting RPC.
    pub async fn list_with_product_counts(&self) -> Result<Vec<UserProfile>, RepoError> {
        #[derive(Deserialize)]
        struct RpcRow {
            id: Uuid,
            email: Option<String>,
            role: Option<UserRole>,
            product_count: Option<i64>,
        }

        let url = self.rest_url("rpc/get_users_with_products");
        let resp = self
            .authed(self.client.post(&url))
            .header("Content-Type", "application/json")
            .json(&json!({}))
            .send()
            .await?;

        let body = expect_success(resp).await?;
        let rows: Vec<RpcRow> = serde_json::from_str(&body)?;

        Ok(rows
            .into_iter()
            .map(|row| UserProfile {
                id: row.id,
                email: row.email.unwrap_or_else(|| "Sem email".to_string()),
                role: row.role.unwrap_or(UserRole::User),
                product_count: row.product_count,
                created_at: None,
                updated_at: None,
            })
            .collect())
    }

    pub async fn count(&self) -> Result<u64, RepoError> {
        let url = format!("{}?select=id", self.rest_url("user_profiles"));
        let resp = self
            .authed(self.client.get(&url))
            .header("Prefer", "count=exact")
            .header("Range", "0-0")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RepoError::Supabase { status, body });
        }

        let count = resp
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit('/').next())
            .and_then(|total| total.parse::<u64>().ok())
            .unwrap_or(0);
        Ok(count)
    }

    /// Removes the profile row. The caller is responsible for deleting the
    /// user's products first.
    pub async fn delete(&self, user_id: Uuid) -> Result<(), RepoError> {
        let url = format!("{}?id=eq.{user_id}", self.rest_url("user_profiles"));
        let resp = self.authed(self.client.delete(&url)).send().await?;
        expect_success(resp).await?;
        Ok(())
    }
}
