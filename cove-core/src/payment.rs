use cove_shared::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque authorization token from the external payment-form collaborator.
/// The engine never sees raw payment credentials.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentToken(pub String);

impl fmt::Debug for PaymentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PaymentToken(********)")
    }
}

/// How the guest pays the grand total.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentOption {
    /// Everything up front.
    Full,
    /// Half now, the rest before check-in.
    Deposit,
    /// Three installments.
    Split3,
}

/// The charge the reservation collaborator should execute now.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInstruction {
    pub token: PaymentToken,
    pub amount_due_now: Money,
    pub option: PaymentOption,
}
