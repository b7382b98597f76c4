use chrono::{DateTime, NaiveDate, Utc};
use cove_core::payment::PaymentOption;
use cove_core::quote::PricingQuote;
use cove_core::reservation::{GuestInfo, PartyComposition};
use cove_shared::Money;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum DateRangeError {
    #[error("Check-out must be after check-in")]
    Backwards,
}

/// A stay window. Always non-empty: check-out is strictly after check-in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl DateRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, DateRangeError> {
        if check_out <= check_in {
            return Err(DateRangeError::Backwards);
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Whole days between check-in and check-out.
    pub fn nights(&self) -> u32 {
        (self.check_out - self.check_in).num_days() as u32
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddonPricing {
    Flat,
    PerNight,
}

/// Catalog entry for a bookable add-on (early check-in, firewood, mid-stay
/// clean, ...). The catalog itself is externally supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Addon {
    pub id: String,
    pub name: String,
    pub price: Money,
    pub pricing: AddonPricing,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddonSelection {
    pub addon_id: String,
    pub quantity: u32,
}

/// Trip-protection plan. At most one may be selected; selecting another
/// replaces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsurancePlan {
    pub id: String,
    pub name: String,
    /// Fraction of the trip total, e.g. 0.07.
    pub premium_rate: f64,
}

/// A conditionally required lease clause the guest must acknowledge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Addendum {
    pub id: String,
    pub title: String,
    pub required: bool,
}

/// The terms a signature was captured against. If any of these drift after
/// signing, the signature no longer covers the current terms and is dropped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TermsFingerprint {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub pets: u32,
    pub grand_total: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agreement {
    pub signature: String,
    pub accepted_addendum_ids: Vec<String>,
    pub signed_at: DateTime<Utc>,
    pub terms: TermsFingerprint,
}

/// The aggregate root for one checkout session. Created when the checkout is
/// entered, filled in step by step, and dropped on successful submission or
/// abandonment. Never shared across sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDraft {
    pub id: Uuid,
    pub property_id: Uuid,
    pub dates: Option<DateRange>,
    pub quote: Option<PricingQuote>,
    pub addon_selections: Vec<AddonSelection>,
    pub insurance: Option<InsurancePlan>,
    pub guest: GuestInfo,
    pub party: PartyComposition,
    pub agreement: Option<Agreement>,
    pub payment_option: PaymentOption,
    pub created_at: DateTime<Utc>,
}

impl BookingDraft {
    pub fn new(property_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            property_id,
            dates: None,
            quote: None,
            addon_selections: Vec::new(),
            insurance: None,
            guest: GuestInfo::default(),
            party: PartyComposition::default(),
            agreement: None,
            payment_option: PaymentOption::Full,
            created_at: Utc::now(),
        }
    }
}
