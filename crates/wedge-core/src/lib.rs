pub mod constants;
pub mod error;
pub mod state;

pub use error::{Error, Result};
pub use state::RunState;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
