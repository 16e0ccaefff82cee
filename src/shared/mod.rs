pub mod context;
pub mod shutdown;
pub mod types;

pub use context::CallContext;
pub use shutdown::*;
pub use types::*;
