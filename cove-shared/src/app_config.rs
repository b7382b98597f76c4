use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub booking_rules: BookingRules,
    #[serde(default)]
    pub demand: DemandRules,
}

/// Checkout-level business rules.
#[derive(Debug, Deserialize, Clone)]
pub struct BookingRules {
    /// Fallback minimum stay when a property does not carry its own.
    #[serde(default = "default_min_stay")]
    pub min_stay_nights: u32,
    /// Fraction of the grand total charged up front on the deposit plan.
    #[serde(default = "default_deposit_fraction")]
    pub deposit_fraction: f64,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            min_stay_nights: default_min_stay(),
            deposit_fraction: default_deposit_fraction(),
        }
    }
}

fn default_min_stay() -> u32 {
    3
}
fn default_deposit_fraction() -> f64 {
    0.5
}

/// A recurring holiday, by month and day.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

/// Tuning knobs for the display-only demand price simulator.
#[derive(Debug, Deserialize, Clone)]
pub struct DemandRules {
    #[serde(default = "default_peak_months")]
    pub peak_months: Vec<u32>,
    #[serde(default = "default_shoulder_months")]
    pub shoulder_months: Vec<u32>,
    #[serde(default = "default_peak_multiplier")]
    pub peak_multiplier: f64,
    #[serde(default = "default_shoulder_multiplier")]
    pub shoulder_multiplier: f64,
    #[serde(default = "default_off_multiplier")]
    pub off_multiplier: f64,
    /// Applied to Friday and Saturday nights.
    #[serde(default = "default_weekend_multiplier")]
    pub weekend_multiplier: f64,
    #[serde(default = "default_holiday_multiplier")]
    pub holiday_multiplier: f64,
    /// Days on either side of a holiday that still count as the holiday window.
    #[serde(default = "default_holiday_window_days")]
    pub holiday_window_days: i64,
    #[serde(default = "default_holidays")]
    pub holidays: Vec<MonthDay>,
    #[serde(default = "default_jitter_low")]
    pub jitter_low: f64,
    #[serde(default = "default_jitter_high")]
    pub jitter_high: f64,
    /// Probability that a simulated night shows as available.
    #[serde(default = "default_availability_rate")]
    pub availability_rate: f64,
}

impl Default for DemandRules {
    fn default() -> Self {
        Self {
            peak_months: default_peak_months(),
            shoulder_months: default_shoulder_months(),
            peak_multiplier: default_peak_multiplier(),
            shoulder_multiplier: default_shoulder_multiplier(),
            off_multiplier: default_off_multiplier(),
            weekend_multiplier: default_weekend_multiplier(),
            holiday_multiplier: default_holiday_multiplier(),
            holiday_window_days: default_holiday_window_days(),
            holidays: default_holidays(),
            jitter_low: default_jitter_low(),
            jitter_high: default_jitter_high(),
            availability_rate: default_availability_rate(),
        }
    }
}

fn default_peak_months() -> Vec<u32> {
    vec![6, 7, 8, 12]
}
fn default_shoulder_months() -> Vec<u32> {
    vec![4, 5, 9, 10]
}
fn default_peak_multiplier() -> f64 {
    1.5
}
fn default_shoulder_multiplier() -> f64 {
    1.2
}
fn default_off_multiplier() -> f64 {
    0.8
}
fn default_weekend_multiplier() -> f64 {
    1.15
}
fn default_holiday_multiplier() -> f64 {
    1.3
}
fn default_holiday_window_days() -> i64 {
    1
}
fn default_holidays() -> Vec<MonthDay> {
    vec![
        MonthDay { month: 1, day: 1 },
        MonthDay { month: 7, day: 4 },
        MonthDay { month: 11, day: 27 },
        MonthDay { month: 12, day: 25 },
        MonthDay { month: 12, day: 31 },
    ]
}
fn default_jitter_low() -> f64 {
    0.95
}
fn default_jitter_high() -> f64 {
    1.05
}
fn default_availability_rate() -> f64 {
    0.85
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `COVE__BOOKING_RULES__MIN_STAY_NIGHTS=2`
            .add_source(config::Environment::with_prefix("COVE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
