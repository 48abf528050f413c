use serde::{Deserialize, Serialize};

use crate::models::user::UserRole;

#[derive(Debug, Deserialize)]
pub struct UpdateRoleIn {
    pub role: UserRole,
}

/// System-wide totals for the admin dashboard.
#[derive(Debug, Serialize)]
pub struct SystemStatsOut {
    pub total_users: u64,
    pub total_products: usize,
    pub total_expired: usize,
    pub total_expiring: usize,
}
