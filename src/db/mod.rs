//! Database module for the Fridgy server
//!
//! Storage is reached only through the traits below. `DbOperations` backs
//! them with Postgres; `InMemoryStore` backs them with process memory for
//! tests and local runs.

pub mod memory;
pub mod models;
pub mod operations;

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::Result;

pub use memory::InMemoryStore;
pub use models::{PlanStatus, SavedRecipe, Subscription, User};
pub use operations::DbOperations;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    async fn get_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>>;

    /// Insert or overwrite the row keyed by `subscription.user_id`.
    async fn upsert_subscription(&self, subscription: &Subscription) -> Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Generations recorded for the user on `date`; no row reads as 0.
    async fn generations_on(&self, user_id: Uuid, date: NaiveDate) -> Result<u32>;

    /// Atomically add one generation for `(user_id, date)`, creating the row
    /// if needed, and return the new count.
    async fn increment_generations(&self, user_id: Uuid, date: NaiveDate) -> Result<u32>;
}

#[async_trait]
pub trait SavedRecipeStore: Send + Sync {
    async fn insert_recipe(&self, recipe: &SavedRecipe) -> Result<()>;

    /// The user's recipes, newest first.
    async fn list_recipes(&self, user_id: Uuid) -> Result<Vec<SavedRecipe>>;

    /// Delete `recipe_id` only if it belongs to `user_id`. Returns whether a
    /// row was removed.
    async fn delete_recipe(&self, user_id: Uuid, recipe_id: Uuid) -> Result<bool>;

    async fn count_recipes(&self, user_id: Uuid) -> Result<u64>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Record an authenticated caller, creating the row on first sight and
    /// refreshing the email when the token carries one.
    async fn ensure_user(&self, user_id: Uuid, email: Option<String>) -> Result<()>;
}

/// Handles to every store, usually all backed by the same object.
#[derive(Clone)]
pub struct Stores {
    pub entitlements: Arc<dyn EntitlementStore>,
    pub usage: Arc<dyn UsageStore>,
    pub recipes: Arc<dyn SavedRecipeStore>,
    pub users: Arc<dyn UserDirectory>,
}

impl Stores {
    pub fn from_shared<S>(store: Arc<S>) -> Self
    where
        S: EntitlementStore + UsageStore + SavedRecipeStore + UserDirectory + 'static,
    {
        Self {
            entitlements: store.clone(),
            usage: store.clone(),
            recipes: store.clone(),
            users: store,
        }
    }
}
