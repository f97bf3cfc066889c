pub mod dashboard;
pub mod gas;
pub mod health;
pub mod portfolio;
pub mod sessions;
pub mod state;
pub mod stats;

pub use dashboard::*;
pub use gas::*;
pub use health::*;
pub use portfolio::*;
pub use sessions::*;
pub use state::*;
pub use stats::*;
