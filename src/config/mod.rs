//! Configuration: environment-driven [`Config`] plus the policy constants
//! (token lifetime, hash cost, rate limits, reporting thresholds).

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
