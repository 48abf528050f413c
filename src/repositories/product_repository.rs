// Thin wrapper over the `products` table via PostgREST. All calls use the
// service-role key, so the visibility scope must be resolved by the caller
// and is applied here as a row filter; it never comes from request input
// directly.

use reqwest::Client;
use serde_json::json;
use uuid::Uuid;

use crate::config::SupabaseConfig;
use crate::dtos::product_dtos::UpdateProductDTO;
use crate::models::product::{NewProduct, Product, ProductStatus};
use crate::repositories::{expect_success, RepoError};

/// Visibility scope for product queries, resolved from the caller's profile
/// role before any query is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductScope {
    /// Regular user: only their own rows.
    Owner(Uuid),
    /// Admin viewing every user's rows.
    AllUsers,
    /// Admin viewing a specific user's rows.
    ViewAs(Uuid),
}

impl ProductScope {
    /// The `user_id` filter this scope imposes, if any.
    pub fn user_filter(&self) -> Option<Uuid> {
        match self {
            ProductScope::Owner(id) | ProductScope::ViewAs(id) => Some(*id),
            ProductScope::AllUsers => None,
        }
    }
}

#[derive(Clone)]
pub struct ProductRepository {
    client: Client,
    supabase_url: String,
    service_key: String,
}

impl ProductRepository {
    pub fn new(config: &SupabaseConfig, client: Client) -> Self {
        Self {
            client,
            supabase_url: config.url.clone(),
            service_key: config.service_role_key.clone(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/products", self.supabase_url.trim_end_matches('/'))
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", &self.service_key))
    }

    /// Lists products in the scope, expiry-ascending (the order every caller
    /// wants before grouping).
    pub async fn list(&self, scope: ProductScope) -> Result<Vec<Product>, RepoError> {
        let mut url = format!("{}?select=*&order=expiry_date.asc", self.table_url());
        if let Some(user_id) = scope.user_filter() {
            url.push_str(&format!("&user_id=eq.{user_id}"));
        }

        let resp = self.authed(self.client.get(&url)).send().await?;
        let body = expect_success(resp).await?;
        let products: Vec<Product> = serde_json::from_str(&body)?;
        Ok(products)
    }

    pub async fn get(&self, id: Uuid, scope: ProductScope) -> Result<Product, RepoError> {
        let mut url = format!("{}?select=*&id=eq.{id}", self.table_url());
        if let Some(user_id) = scope.user_filter() {
            url.push_str(&format!("&user_id=eq.{user_id}"));
        }

        let resp = self.authed(self.client.get(&url)).send().await?;
        let body = expect_success(resp).await?;
        let products: Vec<Product> = serde_json::from_str(&body)?;
        products.into_iter().next().ok_or(RepoError::NotFound)
    }

    pub async fn create(&self, input: &NewProduct) -> Result<Product, RepoError> {
        let resp = self
            .authed(self.client.post(self.table_url()))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .json(input)
            .send()
            .await?;

        let body = expect_success(resp).await?;
        let products: Vec<Product> = serde_json::from_str(&body)?;
        products.into_iter().next().ok_or(RepoError::NotFound)
    }

    pub async fn update(
        &self,
        id: Uuid,
        scope: ProductScope,
        patch: &UpdateProductDTO,
    ) -> Result<Product, RepoError> {
        let mut url = format!("{}?id=eq.{id}", self.table_url());
        if let Some(user_id) = scope.user_filter() {
            url.push_str(&format!("&user_id=eq.{user_id}"));
        }

        let resp = self
            .authed(self.client.patch(&url))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await?;

        let body = expect_success(resp).await?;
        let products: Vec<Product> = serde_json::from_str(&body)?;
        products.into_iter().next().ok_or(RepoError::NotFound)
    }

    pub async fn delete(&self, id: Uuid, scope: ProductScope) -> Result<(), RepoError> {
        let mut url = format!("{}?id=eq.{id}", self.table_url());
        if let Some(user_id) = scope.user_filter() {
            url.push_str(&format!("&user_id=eq.{user_id}"));
        }

        let resp = self.authed(self.client.delete(&url)).send().await?;
        expect_success(resp).await?;
        Ok(())
    }

    /// Deletes a batch in one `id=in.(...)` request; all-or-nothing as
    /// reported by the backend, no per-item retry.
    pub async fn delete_many(&self, ids: &[Uuid], scope: ProductScope) -> Result<(), RepoError> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut url = format!("{}?id=in.({})", self.table_url(), id_list(ids));
        if let Some(user_id) = scope.user_filter() {
            url.push_str(&format!("&user_id=eq.{user_id}"));
        }

        let resp = self.authed(self.client.delete(&url)).send().await?;
        expect_success(resp).await?;
        Ok(())
    }

    /// Moves a batch to a markdown stage in one request.
    pub async fn update_status_many(
        &self,
        ids: &[Uuid],
        status: ProductStatus,
        scope: ProductScope,
    ) -> Result<(), RepoError> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut url = format!("{}?id=in.({})", self.table_url(), id_list(ids));
        if let Some(user_id) = scope.user_filter() {
            url.push_str(&format!("&user_id=eq.{user_id}"));
        }

        let resp = self
            .authed(self.client.patch(&url))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=minimal")
            .json(&json!({ "status": status }))
            .send()
            .await?;

        expect_success(resp).await?;
        Ok(())
    }

    /// Removes every product owned by a user. Used when an admin deletes the
    /// account.
    pub async fn delete_for_user(&self, user_id: Uuid) -> Result<(), RepoError> {
        let url = format!("{}?user_id=eq.{user_id}", self.table_url());
        let resp = self.authed(self.client.delete(&url)).send().await?;
        expect_success(resp).await?;
        Ok(())
    }

    /// Row count without fetching rows, via the PostgREST `Content-Range`
    /// header.
    pub async fn count(&self, scope: ProductScope) -> Result<u64, RepoError> {
        let mut url = format!("{}?select=id", self.table_url());
        if let Some(user_id) = scope.user_filter() {
            url.push_str(&format!("&user_id=eq.{user_id}"));
        }

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
}

fn id_list(ids: &[Uuid]) -> String {
    ids.iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_filters() {
        let id = Uuid::new_v4();
        assert_eq!(ProductScope::Owner(id).user_filter(), Some(id));
        assert_eq!(ProductScope::ViewAs(id).user_filter(), Some(id));
        assert_eq!(ProductScope::AllUsers.user_filter(), None);
    }

    #[test]
    fn id_list_joins_with_commas() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(id_list(&[a, b]), format!("{a},{b}"));
    }
}
