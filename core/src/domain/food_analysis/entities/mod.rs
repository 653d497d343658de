pub mod analysis_request;
pub mod analysis_result;

pub use analysis_request::*;
pub use analysis_result::*;
