pub mod fetch_state;
pub mod movie;
pub mod search_count;

pub use fetch_state::*;
pub use movie::*;
pub use search_count::*;
