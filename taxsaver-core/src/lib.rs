pub mod calculations;
pub mod db;
pub mod models;

pub use db::repository::{PlannerRepository, RepositoryError};
pub use models::*;
