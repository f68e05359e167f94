use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Local single-user profile. A label on the planner data set; there is no
/// password and no authorization behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// For registering a new profile (no id or timestamp).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUserProfile {
    pub name: String,
    pub email: String,
}
