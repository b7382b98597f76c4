pub mod app_config;
pub mod money;

pub use money::Money;
