use async_trait::async_trait;
use chrono::NaiveDate;
use cove_shared::Money;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightlyRate {
    pub date: NaiveDate,
    pub amount: Money,
}

/// An authoritative quote for a date range, produced by the external
/// availability/pricing collaborator.
///
/// Immutable once produced; when dates change the owner replaces the whole
/// quote rather than patching it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingQuote {
    pub property_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: u32,
    pub nightly: Vec<NightlyRate>,
    pub subtotal: Money,
    pub fees: Money,
    pub taxes: Money,
    pub total: Money,
}

#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("Dates are not available")]
    NotAvailable,

    #[error("Quote lookup failed: {0}")]
    Transport(String),
}

/// External availability/pricing collaborator.
#[async_trait]
pub trait QuoteService: Send + Sync {
    async fn get_quote(
        &self,
        property_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<PricingQuote, QuoteError>;
}
