pub mod movie_service;
pub mod popularity_service;

pub use movie_service::*;
pub use popularity_service::*;
