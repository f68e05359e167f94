use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Expense, FamilyMember, NewExpense, NewFamilyMember, NewSavingsGoal, NewScenarioRecord,
    NewUserProfile, SavingsGoal, ScenarioRecord, UserProfile,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Storage contract for the planner's local records.
///
/// The engine never touches this; persistence is strictly a caller-side
/// concern. Implementations are local, single-user stores, the analog of
/// the original per-browser storage, with no durability guarantees implied.
#[async_trait]
pub trait PlannerRepository: Send + Sync {
    // Local profile
    async fn create_profile(&self, profile: NewUserProfile)
    -> Result<UserProfile, RepositoryError>;
    async fn get_profile_by_email(&self, email: &str) -> Result<UserProfile, RepositoryError>;

    // Family members
    async fn add_family_member(
        &self,
        member: NewFamilyMember,
    ) -> Result<FamilyMember, RepositoryError>;
    async fn get_family_member(&self, id: i64) -> Result<FamilyMember, RepositoryError>;
    async fn update_family_member(&self, member: &FamilyMember) -> Result<(), RepositoryError>;
    async fn remove_family_member(&self, id: i64) -> Result<(), RepositoryError>;
    async fn list_family_members(&self) -> Result<Vec<FamilyMember>, RepositoryError>;

    // Expenses
    async fn add_expense(&self, expense: NewExpense) -> Result<Expense, RepositoryError>;
    async fn get_expense(&self, id: i64) -> Result<Expense, RepositoryError>;
    async fn update_expense(&self, expense: &Expense) -> Result<(), RepositoryError>;
    async fn remove_expense(&self, id: i64) -> Result<(), RepositoryError>;
    async fn list_expenses(&self) -> Result<Vec<Expense>, RepositoryError>;

    // Savings goals
    async fn add_goal(&self, goal: NewSavingsGoal) -> Result<SavingsGoal, RepositoryError>;
    async fn get_goal(&self, id: i64) -> Result<SavingsGoal, RepositoryError>;
    async fn update_goal(&self, goal: &SavingsGoal) -> Result<(), RepositoryError>;
    async fn remove_goal(&self, id: i64) -> Result<(), RepositoryError>;
    async fn list_goals(&self) -> Result<Vec<SavingsGoal>, RepositoryError>;

    // Saved scenarios
    async fn save_scenario(
        &self,
        scenario: NewScenarioRecord,
    ) -> Result<ScenarioRecord, RepositoryError>;
    async fn get_scenario(&self, id: i64) -> Result<ScenarioRecord, RepositoryError>;
    async fn list_scenarios(&self) -> Result<Vec<ScenarioRecord>, RepositoryError>;
    async fn delete_scenario(&self, id: i64) -> Result<(), RepositoryError>;
}
