pub mod observation;
pub mod portfolio;
pub mod response;
pub mod series;

pub use observation::*;
pub use portfolio::*;
pub use response::*;
pub use series::*;
