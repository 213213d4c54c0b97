use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::db::models::{PlanStatus, SavedRecipe, Subscription, User};
use crate::db::{EntitlementStore, SavedRecipeStore, UsageStore, UserDirectory};
use crate::error::{AppError, DatabaseError};
use crate::generation::{Difficulty, Nutrition};
use crate::Result;

pub struct DbOperations {
    pool: Arc<PgPool>,
}

#[derive(FromRow)]
struct SubscriptionRow {
    user_id: Uuid,
    email: Option<String>,
    plan_status: String,
    subscription_expiry: Option<DateTime<Utc>>,
    paystack_reference: Option<String>,
    amount_paid: Option<i64>,
    currency: Option<String>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = AppError;

    fn try_from(row: SubscriptionRow) -> Result<Self> {
        let plan_status = row
            .plan_status
            .parse::<PlanStatus>()
            .map_err(|e| AppError::DatabaseError(DatabaseError::InvalidValue(e)))?;

        Ok(Subscription {
            user_id: row.user_id,
            email: row.email,
            plan_status,
            subscription_expiry: row.subscription_expiry,
            paystack_reference: row.paystack_reference,
            amount_paid: row.amount_paid,
            currency: row.currency,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct SavedRecipeRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    ingredients: Vec<String>,
    instructions: Vec<String>,
    cooking_time: String,
    servings: i32,
    difficulty: String,
    nutrition: Json<Nutrition>,
    created_at: DateTime<Utc>,
}

impl TryFrom<SavedRecipeRow> for SavedRecipe {
    type Error = AppError;

    fn try_from(row: SavedRecipeRow) -> Result<Self> {
        let difficulty = row
            .difficulty
            .parse::<Difficulty>()
            .map_err(|e| AppError::DatabaseError(DatabaseError::InvalidValue(e)))?;

        Ok(SavedRecipe {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            ingredients: row.ingredients,
            instructions: row.instructions,
            cooking_time: row.cooking_time,
            servings: u32::try_from(row.servings).unwrap_or(0),
            difficulty,
            nutrition: row.nutrition.0,
            created_at: row.created_at,
        })
    }
}

fn to_count(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

impl DbOperations {
    pub async fn new_with_options(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
            .map_err(|e| AppError::DatabaseError(DatabaseError::ConnectionError(e.to_string())))?;

        Ok(Self { pool: Arc::new(pool) })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(self.pool.as_ref()).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub async fn create_user(&self, user: &User) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, display_name, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, display_name, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.created_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(user)
    }

}

#[async_trait]
impl EntitlementStore for DbOperations {
    async fn get_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT user_id, email, plan_status, subscription_expiry, paystack_reference,
                   amount_paid, currency, updated_at
            FROM subscriptions WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Subscription::try_from).transpose()
    }

    async fn upsert_subscription(&self, subscription: &Subscription) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (user_id, email, plan_status, subscription_expiry,
                                       paystack_reference, amount_paid, currency, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO UPDATE SET
                email = EXCLUDED.email,
                plan_status = EXCLUDED.plan_status,
                subscription_expiry = EXCLUDED.subscription_expiry,
                paystack_reference = EXCLUDED.paystack_reference,
                amount_paid = EXCLUDED.amount_paid,
                currency = EXCLUDED.currency,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(subscription.user_id)
        .bind(&subscription.email)
        .bind(subscription.plan_status.as_str())
        .bind(subscription.subscription_expiry)
        .bind(&subscription.paystack_reference)
        .bind(subscription.amount_paid)
        .bind(&subscription.currency)
        .bind(subscription.updated_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}

#[async_trait]
impl UsageStore for DbOperations {
    async fn generations_on(&self, user_id: Uuid, date: NaiveDate) -> Result<u32> {
        let count: Option<i32> = sqlx::query_scalar(
            "SELECT recipe_generations FROM usage_tracking WHERE user_id = $1 AND date = $2",
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(count.map(to_count).unwrap_or(0))
    }

    async fn increment_generations(&self, user_id: Uuid, date: NaiveDate) -> Result<u32> {
        let count: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO usage_tracking (user_id, date, recipe_generations, updated_at)
            VALUES ($1, $2, 1, NOW())
            ON CONFLICT (user_id, date) DO UPDATE SET
                recipe_generations = usage_tracking.recipe_generations + 1,
                updated_at = NOW()
            RETURNING recipe_generations
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(to_count(count))
    }
}

#[async_trait]
impl SavedRecipeStore for DbOperations {
    async fn insert_recipe(&self, recipe: &SavedRecipe) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO saved_recipes (id, user_id, title, ingredients, instructions,
                                       cooking_time, servings, difficulty, nutrition, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(recipe.id)
        .bind(recipe.user_id)
        .bind(&recipe.title)
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .bind(&recipe.cooking_time)
        .bind(i32::try_from(recipe.servings).unwrap_or(i32::MAX))
        .bind(recipe.difficulty.as_str())
        .bind(Json(&recipe.nutrition))
        .bind(recipe.created_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn list_recipes(&self, user_id: Uuid) -> Result<Vec<SavedRecipe>> {
        let rows = sqlx::query_as::<_, SavedRecipeRow>(
            r#"
            SELECT id, user_id, title, ingredients, instructions, cooking_time, servings,
                   difficulty, nutrition, created_at
            FROM saved_recipes WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(SavedRecipe::try_from).collect()
    }

    async fn delete_recipe(&self, user_id: Uuid, recipe_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM saved_recipes WHERE id = $1 AND user_id = $2")
            .bind(recipe_id)
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_recipes(&self, user_id: Uuid) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM saved_recipes WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[async_trait]
impl UserDirectory for DbOperations {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, display_name, created_at FROM users WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    async fn ensure_user(&self, user_id: Uuid, email: Option<String>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (id) DO UPDATE SET
                email = COALESCE(EXCLUDED.email, users.email)
            "#,
        )
        .bind(user_id)
        .bind(email)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}
