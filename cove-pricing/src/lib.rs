pub mod demand;

pub use demand::{DemandError, DemandLevel, DemandSimulator, NightlyEstimate, RangeEstimate};
