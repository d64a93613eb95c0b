// HTTP routes
pub mod ask;
pub mod health;
pub mod policies;

pub use ask::*;
pub use health::*;
pub use policies::*;
