mod age_bracket;
mod deduction;
mod expense;
mod family_member;
mod profile;
mod savings_goal;
mod scenario_record;
mod tax_slab;

pub use age_bracket::AgeBracket;
pub use deduction::{DeductionCategory, DeductionClaims, DeductionError};
pub use expense::{Expense, NewExpense};
pub use family_member::{FamilyMember, NewFamilyMember};
pub use profile::{NewUserProfile, UserProfile};
pub use savings_goal::{GoalPriority, NewSavingsGoal, SavingsGoal};
pub use scenario_record::{NewScenarioRecord, ScenarioRecord};
pub use tax_slab::TaxSlab;
