use std::env;

use anyhow::{Context, Result};

/// Supabase project settings read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    pub service_role_key: String,
    /// HS256 secret used to verify access tokens locally.
    pub jwt_secret: String,
}

impl SupabaseConfig {
    pub fn from_env() -> Result<Self> {
        let url = env::var("SUPABASE_URL")
            .context("SUPABASE_URL not set")?
            .trim()
            .trim_end_matches('/')
            .to_string();
        let anon_key = env::var("SUPABASE_ANON_KEY")
            .context("SUPABASE_ANON_KEY not set")?
            .trim()
            .to_string();
        let service_role_key = env::var("SUPABASE_SERVICE_ROLE_KEY")
            .context("SUPABASE_SERVICE_ROLE_KEY not set")?
            .trim()
            .to_string();
        let jwt_secret = env::var("SUPABASE_JWT_SECRET")
            .context("SUPABASE_JWT_SECRET not set")?
            .trim()
            .to_string();

        Ok(Self {
            url,
            anon_key,
            service_role_key,
            jwt_secret,
        })
    }
}
