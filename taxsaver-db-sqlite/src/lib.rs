pub mod factory;
pub mod repository;
pub mod row;

pub use factory::SqliteRepositoryFactory;
pub use repository::SqliteRepository;
