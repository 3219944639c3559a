pub mod pool;
pub mod repos;

// Re-export commonly used items
pub use pool::{create_pool, init_schema};
pub use repos::user::{UserRepo, UserRow};
