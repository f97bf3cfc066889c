pub mod analytics;
pub mod analyzer;
pub mod forecaster;
pub mod observation_store;
pub mod portfolio;
pub mod resampler;
pub mod session;
pub mod time_of_day;

pub use analytics::Analytics;
pub use analyzer::FeeAnalyzer;
pub use observation_store::ObservationStore;
pub use resampler::BinWidth;
pub use session::{Session, SessionHandle, SessionRegistry};
