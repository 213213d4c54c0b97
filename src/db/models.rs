use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::generation::{Difficulty, Nutrition, Recipe};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    /// Absent for callers whose token carried no email claim.
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, display_name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: Some(email),
            display_name,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Free,
    Monthly,
    Yearly,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Free => "free",
            PlanStatus::Monthly => "monthly",
            PlanStatus::Yearly => "yearly",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(PlanStatus::Free),
            "monthly" => Ok(PlanStatus::Monthly),
            "yearly" => Ok(PlanStatus::Yearly),
            other => Err(format!("unknown plan status '{}'", other)),
        }
    }
}

/// A user's entitlement row in `subscriptions`.
///
/// Premium status is never stored; derive it with
/// [`crate::entitlement::is_premium`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub plan_status: PlanStatus,
    pub subscription_expiry: Option<DateTime<Utc>>,
    pub paystack_reference: Option<String>,
    pub amount_paid: Option<i64>,
    pub currency: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRecipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub cooking_time: String,
    pub servings: u32,
    pub difficulty: Difficulty,
    pub nutrition: Nutrition,
    pub created_at: DateTime<Utc>,
}

impl SavedRecipe {
    pub fn new(user_id: Uuid, recipe: Recipe) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: recipe.title,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            cooking_time: recipe.cooking_time,
            servings: recipe.servings,
            difficulty: recipe.difficulty,
            nutrition: recipe.nutrition,
            created_at: Utc::now(),
        }
    }

    /// Case-insensitive match against the title or any ingredient line.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&term)
            || self
                .ingredients
                .iter()
                .any(|ingredient| ingredient.to_lowercase().contains(&term))
    }
}
