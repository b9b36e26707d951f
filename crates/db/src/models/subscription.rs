//! Subscription plan and subscription models.

use luthier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `subscription_plans` lookup table.
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionPlan {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub duration_days: i32,
}

/// A subscription joined with the name of its plan.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Subscription {
    pub id: DbId,
    pub user_id: DbId,
    pub plan_id: DbId,
    pub plan_name: String,
    pub status: String,
    pub started_at: Timestamp,
    pub expires_at: Timestamp,
}

/// DTO for creating a new subscription.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub user_id: DbId,
    pub plan_id: DbId,
    pub status: String,
    pub started_at: Timestamp,
    pub expires_at: Timestamp,
}
