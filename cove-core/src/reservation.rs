use crate::payment::PaymentInstruction;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use cove_shared::Money;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who is staying. Pet count feeds lease addendum generation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartyComposition {
    pub adults: u32,
    pub children: u32,
    pub pets: u32,
}

impl Default for PartyComposition {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            pets: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuestInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl GuestInfo {
    /// Email and identity fields are required; phone is not.
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty()
            && !self.first_name.trim().is_empty()
            && !self.last_name.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonCharge {
    pub addon_id: String,
    pub quantity: u32,
    pub line_total: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsuranceCharge {
    pub plan_id: String,
    pub premium: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub signature: String,
    pub accepted_addendum_ids: Vec<String>,
    pub signed_at: DateTime<Utc>,
}

/// The fully assembled booking sent to the reservation-creation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub property_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub party: PartyComposition,
    pub guest: GuestInfo,
    pub addons: Vec<AddonCharge>,
    pub insurance: Option<InsuranceCharge>,
    pub agreement: SignatureRecord,
    pub payment: PaymentInstruction,
    pub grand_total: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationConfirmation {
    pub reservation_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    /// The dates were taken between quoting and submission.
    #[error("Dates are no longer available")]
    DatesUnavailable,

    /// Non-retryable validation failure from the collaborator.
    #[error("Reservation rejected: {0}")]
    Rejected(String),

    /// Transient network failure; safe to retry on user action.
    #[error("Reservation request failed: {0}")]
    Transport(String),
}

impl ReservationError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReservationError::Transport(_))
    }
}

/// External reservation-creation collaborator.
#[async_trait]
pub trait ReservationApi: Send + Sync {
    async fn create_reservation(
        &self,
        request: &ReservationRequest,
    ) -> Result<ReservationConfirmation, ReservationError>;
}
