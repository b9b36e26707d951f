//! Repository for `subscription_plans` and `subscriptions`.

use luthier_core::policy::SUBSCRIPTION_STATUS_ACTIVE;
use luthier_core::types::DbId;
use sqlx::PgPool;

use crate::models::subscription::{NewSubscription, Subscription, SubscriptionPlan};

const PLAN_COLUMNS: &str = "id, name, description, price_cents, duration_days";

const COLUMNS: &str = "s.id, s.user_id, s.plan_id, p.name AS plan_name, s.status, \
                       s.started_at, s.expires_at";

/// Provides plan lookups and subscription persistence.
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Find a plan by its unique name.
    pub async fn find_plan_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<SubscriptionPlan>, sqlx::Error> {
        let query = format!("SELECT {PLAN_COLUMNS} FROM subscription_plans WHERE name = $1");
        sqlx::query_as::<_, SubscriptionPlan>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Insert a subscription, returning it joined with its plan name.
    pub async fn create(
        pool: &PgPool,
        input: &NewSubscription,
    ) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "WITH s AS (
                 INSERT INTO subscriptions (user_id, plan_id, status, started_at, expires_at)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING *
             )
             SELECT {COLUMNS} FROM s JOIN subscription_plans p ON p.id = s.plan_id"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(input.user_id)
            .bind(input.plan_id)
            .bind(&input.status)
            .bind(input.started_at)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// The most recent active subscription for `user_id`.
    pub async fn find_active_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subscriptions s
             JOIN subscription_plans p ON p.id = s.plan_id
             WHERE s.user_id = $1 AND s.status = $2
             ORDER BY s.started_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(user_id)
            .bind(SUBSCRIPTION_STATUS_ACTIVE)
            .fetch_optional(pool)
            .await
    }
}
