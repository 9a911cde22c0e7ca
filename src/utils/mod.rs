pub mod debounce;
pub mod format;

pub use debounce::*;
pub use format::*;
