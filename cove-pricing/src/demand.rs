use chrono::{Datelike, Days, NaiveDate, Weekday};
use cove_shared::app_config::DemandRules;
use cove_shared::Money;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Display classification for calendar coloring. Never a pricing authority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DemandLevel {
    Low,
    Medium,
    High,
}

/// Indicative per-night figure for the date-selection calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightlyEstimate {
    pub date: NaiveDate,
    pub price: Money,
    pub available: bool,
    pub demand: DemandLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeEstimate {
    pub nights: u32,
    pub total: Money,
    pub average: Money,
}

#[derive(Debug, thiserror::Error)]
pub enum DemandError {
    #[error("Check-out must be after check-in")]
    EmptyRange,
}

/// Demand-based nightly price simulator.
///
/// Output is advisory and display-only: it feeds the date-selection calendar,
/// while the chargeable total always comes from the external pricing
/// collaborator's quote. Factors compound multiplicatively in a fixed order
/// (season, weekend, holiday) so the pre-jitter figure is reproducible.
pub struct DemandSimulator {
    rules: DemandRules,
}

impl DemandSimulator {
    pub fn new(rules: DemandRules) -> Self {
        Self { rules }
    }

    pub fn with_defaults() -> Self {
        Self::new(DemandRules::default())
    }

    /// Deterministic pre-jitter multiplier and demand level for a night.
    pub fn multiplier(&self, date: NaiveDate) -> (f64, DemandLevel) {
        let month = date.month();
        let (mut factor, mut demand) = if self.rules.peak_months.contains(&month) {
            (self.rules.peak_multiplier, DemandLevel::High)
        } else if self.rules.shoulder_months.contains(&month) {
            (self.rules.shoulder_multiplier, DemandLevel::Medium)
        } else {
            (self.rules.off_multiplier, DemandLevel::Low)
        };

        if matches!(date.weekday(), Weekday::Fri | Weekday::Sat) {
            factor *= self.rules.weekend_multiplier;
        }

        if self.in_holiday_window(date) {
            factor *= self.rules.holiday_multiplier;
            demand = DemandLevel::High;
        }

        (factor, demand)
    }

    fn in_holiday_window(&self, date: NaiveDate) -> bool {
        let window = self.rules.holiday_window_days;
        self.rules.holidays.iter().any(|holiday| {
            // Candidate years on both sides so windows crossing New Year match.
            [date.year() - 1, date.year(), date.year() + 1]
                .into_iter()
                .filter_map(|year| NaiveDate::from_ymd_opt(year, holiday.month, holiday.day))
                .any(|d| (date - d).num_days().abs() <= window)
        })
    }

    pub fn estimate(&self, date: NaiveDate, base_rate: Money) -> NightlyEstimate {
        self.estimate_with_rng(date, base_rate, &mut rand::thread_rng())
    }

    pub fn estimate_with_rng<R: Rng>(
        &self,
        date: NaiveDate,
        base_rate: Money,
        rng: &mut R,
    ) -> NightlyEstimate {
        let (factor, demand) = self.multiplier(date);
        let jitter = rng.gen_range(self.rules.jitter_low..=self.rules.jitter_high);
        // Availability is an independent roll, never derived from price.
        // Misconfigured rates are clamped to a valid probability.
        let available = rng.gen_bool(self.rules.availability_rate.clamp(0.0, 1.0));

        NightlyEstimate {
            date,
            price: base_rate.apply_rate(factor * jitter),
            available,
            demand,
        }
    }

    pub fn estimate_range(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        base_rate: Money,
    ) -> Result<RangeEstimate, DemandError> {
        self.estimate_range_with_rng(check_in, check_out, base_rate, &mut rand::thread_rng())
    }

    pub fn estimate_range_with_rng<R: Rng>(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        base_rate: Money,
        rng: &mut R,
    ) -> Result<RangeEstimate, DemandError> {
        if check_out <= check_in {
            return Err(DemandError::EmptyRange);
        }

        let mut total = Money::ZERO;
        let mut nights = 0u32;
        let mut night = check_in;
        while night < check_out {
            total += self.estimate_with_rng(night, base_rate, rng).price;
            nights += 1;
            night = night + Days::new(1);
        }

        Ok(RangeEstimate {
            nights,
            total,
            average: total.div_round(nights as i64),
        })
    }
}
