pub mod redis_repo;
pub mod search_count_repo;

pub use redis_repo::*;
pub use search_count_repo::*;
