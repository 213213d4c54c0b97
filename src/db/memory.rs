use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::models::{SavedRecipe, Subscription, User};
use crate::db::{EntitlementStore, SavedRecipeStore, UsageStore, UserDirectory};
use crate::Result;

/// Process-local store with the same semantics as the Postgres tables.
/// Each increment happens under the write lock, so it is atomic.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    subscriptions: RwLock<HashMap<Uuid, Subscription>>,
    usage: RwLock<HashMap<(Uuid, NaiveDate), u32>>,
    recipes: RwLock<Vec<SavedRecipe>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    /// Seed a day's counter directly.
    pub async fn set_generations(&self, user_id: Uuid, date: NaiveDate, count: u32) {
        self.usage.write().await.insert((user_id, date), count);
    }
}

#[async_trait]
impl EntitlementStore for InMemoryStore {
    async fn get_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>> {
        Ok(self.subscriptions.read().await.get(&user_id).cloned())
    }

    async fn upsert_subscription(&self, subscription: &Subscription) -> Result<()> {
        self.subscriptions
            .write()
            .await
            .insert(subscription.user_id, subscription.clone());
        Ok(())
    }
}

#[async_trait]
impl UsageStore for InMemoryStore {
    async fn generations_on(&self, user_id: Uuid, date: NaiveDate) -> Result<u32> {
        Ok(self.usage.read().await.get(&(user_id, date)).copied().unwrap_or(0))
    }

    async fn increment_generations(&self, user_id: Uuid, date: NaiveDate) -> Result<u32> {
        let mut usage = self.usage.write().await;
        let count = usage.entry((user_id, date)).or_insert(0);
        *count = count.saturating_add(1);
        Ok(*count)
    }
}

#[async_trait]
impl SavedRecipeStore for InMemoryStore {
    async fn insert_recipe(&self, recipe: &SavedRecipe) -> Result<()> {
        self.recipes.write().await.push(recipe.clone());
        Ok(())
    }

    async fn list_recipes(&self, user_id: Uuid) -> Result<Vec<SavedRecipe>> {
        let mut recipes: Vec<SavedRecipe> = self
            .recipes
            .read()
            .await
            .iter()
            .filter(|recipe| recipe.user_id == user_id)
            .cloned()
            .collect();
        recipes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(recipes)
    }

    async fn delete_recipe(&self, user_id: Uuid, recipe_id: Uuid) -> Result<bool> {
        let mut recipes = self.recipes.write().await;
        let before = recipes.len();
        recipes.retain(|recipe| !(recipe.id == recipe_id && recipe.user_id == user_id));
        Ok(recipes.len() < before)
    }

    async fn count_recipes(&self, user_id: Uuid) -> Result<u64> {
        Ok(self
            .recipes
            .read()
            .await
            .iter()
            .filter(|recipe| recipe.user_id == user_id)
            .count() as u64)
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| {
                user.email
                    .as_deref()
                    .is_some_and(|known| known.eq_ignore_ascii_case(email))
            })
            .cloned())
    }

    async fn ensure_user(&self, user_id: Uuid, email: Option<String>) -> Result<()> {
        let mut users = self.users.write().await;
        let user = users.entry(user_id).or_insert_with(|| User {
            id: user_id,
            email: None,
            display_name: None,
            created_at: Utc::now(),
        });
        if email.is_some() {
            user.email = email;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::fallback_recipe;
    use chrono::Duration;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_missing_usage_row_reads_as_zero() {
        let store = InMemoryStore::new();
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(store.generations_on(Uuid::new_v4(), day).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let store = Arc::new(InMemoryStore::new());
        let user_id = Uuid::new_v4();
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        store.set_generations(user_id, day, 1).await;

        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.increment_generations(user_id, day).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.generations_on(user_id, day).await.unwrap(), 3);
        // A new day starts from zero.
        assert_eq!(store.generations_on(user_id, day + Duration::days(1)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_is_scoped_to_owner() {
        let store = InMemoryStore::new();
        let owner = Uuid::new_v4();
        let recipe = SavedRecipe::new(owner, fallback_recipe(&["kale".to_string()]));
        store.insert_recipe(&recipe).await.unwrap();

        assert!(!store.delete_recipe(Uuid::new_v4(), recipe.id).await.unwrap());
        assert_eq!(store.count_recipes(owner).await.unwrap(), 1);

        assert!(store.delete_recipe(owner, recipe.id).await.unwrap());
        assert_eq!(store.count_recipes(owner).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_user_by_email_ignores_case() {
        let store = InMemoryStore::new();
        let user = User::new("Chef@Example.com".to_string(), None);
        store.insert_user(user.clone()).await;

        let found = store.find_user_by_email("chef@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(store.find_user_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ensure_user_creates_then_keeps_email() {
        let store = InMemoryStore::new();
        let id = Uuid::new_v4();

        store.ensure_user(id, None).await.unwrap();
        assert!(store.find_user_by_email("late@example.com").await.unwrap().is_none());

        store.ensure_user(id, Some("Late@Example.com".to_string())).await.unwrap();
        store.ensure_user(id, None).await.unwrap();

        let found = store.find_user_by_email("late@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(id));
        assert_eq!(store.users.read().await.len(), 1);
    }
}
