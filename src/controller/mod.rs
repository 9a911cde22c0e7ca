pub mod fetch;
pub mod session;

pub use fetch::*;
pub use session::*;
