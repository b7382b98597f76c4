use cove_core::invite::{InviteDispatch, InviteOutcome};
use cove_shared::Money;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sum of participant amounts must land within one major unit of the total
/// before the split can be confirmed.
pub const BALANCE_TOLERANCE_MINOR: i64 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitStrategy {
    Equal,
    Custom,
    Percentage,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantStatus {
    Pending,
    Invited,
    Accepted,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitParticipant {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub amount: Money,
    pub percentage: f64,
    pub status: ParticipantStatus,
}

impl SplitParticipant {
    fn new(name: &str, email: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            amount: Money::ZERO,
            percentage: 0.0,
            status: ParticipantStatus::Pending,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    #[error("Split is unbalanced by {difference}")]
    Unbalanced { difference: Money },

    #[error("The payer cannot be removed")]
    PayerImmutable,

    #[error("No participant at index {0}")]
    OutOfRange(usize),
}

/// Divides a total among participants. The payer is always participant 0.
#[derive(Debug, Clone)]
pub struct SplitLedger {
    total: Money,
    strategy: SplitStrategy,
    participants: Vec<SplitParticipant>,
}

impl SplitLedger {
    pub fn new(total: Money, payer_name: &str, payer_email: &str) -> Self {
        let mut payer = SplitParticipant::new(payer_name, payer_email);
        payer.amount = total;
        payer.percentage = 100.0;
        Self {
            total,
            strategy: SplitStrategy::Equal,
            participants: vec![payer],
        }
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn strategy(&self) -> SplitStrategy {
        self.strategy
    }

    pub fn participants(&self) -> &[SplitParticipant] {
        &self.participants
    }

    /// Switching to `Equal` reallocates everyone; the other strategies keep
    /// whatever has been entered so far.
    pub fn set_strategy(&mut self, strategy: SplitStrategy) {
        self.strategy = strategy;
        if strategy == SplitStrategy::Equal {
            self.reallocate_equal();
        }
    }

    /// New participants start at zero under `Custom`/`Percentage`; under
    /// `Equal` the whole ledger is reallocated.
    pub fn add_participant(&mut self, name: &str, email: &str) -> &SplitParticipant {
        self.participants.push(SplitParticipant::new(name, email));
        if self.strategy == SplitStrategy::Equal {
            self.reallocate_equal();
        }
        self.participants.last().expect("just pushed")
    }

    pub fn remove_participant(&mut self, index: usize) -> Result<(), SplitError> {
        if index == 0 {
            return Err(SplitError::PayerImmutable);
        }
        if index >= self.participants.len() {
            return Err(SplitError::OutOfRange(index));
        }
        self.participants.remove(index);
        if self.strategy == SplitStrategy::Equal {
            self.reallocate_equal();
        }
        Ok(())
    }

    pub fn set_amount(&mut self, index: usize, amount: Money) -> Result<(), SplitError> {
        let participant = self.participant_mut(index)?;
        participant.amount = amount;
        Ok(())
    }

    pub fn set_percentage(&mut self, index: usize, percentage: f64) -> Result<(), SplitError> {
        let total = self.total;
        let participant = self.participant_mut(index)?;
        participant.percentage = percentage;
        participant.amount = total.apply_rate(percentage / 100.0);
        Ok(())
    }

    pub fn allocated(&self) -> Money {
        self.participants.iter().map(|p| p.amount).sum()
    }

    pub fn difference(&self) -> Money {
        self.allocated() - self.total
    }

    pub fn is_balanced(&self) -> bool {
        self.difference().abs().minor() < BALANCE_TOLERANCE_MINOR
    }

    pub fn confirm(&self) -> Result<(), SplitError> {
        if !self.is_balanced() {
            return Err(SplitError::Unbalanced {
                difference: self.difference(),
            });
        }
        Ok(())
    }

    /// Dispatches the invitation; on `Failed` the participant stays pending
    /// so the payer can retry. Never retried automatically.
    pub async fn invite(
        &mut self,
        index: usize,
        dispatch: &dyn InviteDispatch,
    ) -> Result<InviteOutcome, SplitError> {
        let email = self.participant_mut(index)?.email.clone();
        let outcome = dispatch.send_invite(&email).await;
        if outcome == InviteOutcome::Invited {
            self.participant_mut(index)?.status = ParticipantStatus::Invited;
        }
        Ok(outcome)
    }

    pub fn mark_accepted(&mut self, index: usize) -> Result<(), SplitError> {
        self.participant_mut(index)?.status = ParticipantStatus::Accepted;
        Ok(())
    }

    pub fn mark_paid(&mut self, index: usize) -> Result<(), SplitError> {
        self.participant_mut(index)?.status = ParticipantStatus::Paid;
        Ok(())
    }

    fn participant_mut(&mut self, index: usize) -> Result<&mut SplitParticipant, SplitError> {
        self.participants
            .get_mut(index)
            .ok_or(SplitError::OutOfRange(index))
    }

    fn reallocate_equal(&mut self) {
        let shares = self.total.split_even(self.participants.len());
        let per = 100.0 / self.participants.len() as f64;
        for (participant, share) in self.participants.iter_mut().zip(shares) {
            participant.amount = share;
            participant.percentage = per;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FlakyDispatch {
        fail_for: String,
    }

    #[async_trait]
    impl InviteDispatch for FlakyDispatch {
        async fn send_invite(&self, email: &str) -> InviteOutcome {
            if email == self.fail_for {
                InviteOutcome::Failed {
                    reason: "mailbox unavailable".into(),
                }
            } else {
                InviteOutcome::Invited
            }
        }
    }

    fn ledger(total_major: i64) -> SplitLedger {
        SplitLedger::new(Money::from_major(total_major), "You", "payer@example.com")
    }

    #[test]
    fn equal_split_is_exact_with_remainder_on_payer() {
        let mut ledger = ledger(1000);
        ledger.add_participant("Ana", "ana@example.com");
        ledger.add_participant("Ben", "ben@example.com");

        let amounts: Vec<Money> = ledger.participants().iter().map(|p| p.amount).collect();
        assert_eq!(amounts[0], Money::from_minor(33334));
        assert_eq!(amounts[1], Money::from_minor(33333));
        assert_eq!(amounts[2], Money::from_minor(33333));
        assert_eq!(ledger.allocated(), Money::from_major(1000));
        assert!(ledger.confirm().is_ok());
    }

    #[test]
    fn equal_split_sums_exactly_for_any_count() {
        for n in 1..=9 {
            let mut ledger = ledger(777);
            for i in 1..n {
                ledger.add_participant(&format!("P{i}"), "p@example.com");
            }
            assert_eq!(ledger.allocated(), Money::from_major(777));
        }
    }

    #[test]
    fn payer_cannot_be_removed() {
        let mut ledger = ledger(500);
        ledger.add_participant("Ana", "ana@example.com");
        assert!(matches!(
            ledger.remove_participant(0),
            Err(SplitError::PayerImmutable)
        ));
        assert!(ledger.remove_participant(1).is_ok());
    }

    #[test]
    fn adding_under_custom_leaves_existing_amounts_untouched() {
        let mut ledger = ledger(900);
        ledger.set_strategy(SplitStrategy::Custom);
        ledger.set_amount(0, Money::from_major(600)).unwrap();
        ledger.add_participant("Ana", "ana@example.com");

        assert_eq!(ledger.participants()[0].amount, Money::from_major(600));
        assert_eq!(ledger.participants()[1].amount, Money::ZERO);
        // Unbalanced until the new participant is allocated manually.
        assert!(ledger.confirm().is_err());
        ledger.set_amount(1, Money::from_major(300)).unwrap();
        assert!(ledger.confirm().is_ok());
    }

    #[test]
    fn percentage_amounts_round_and_balance_within_tolerance() {
        let mut ledger = ledger(1000);
        ledger.set_strategy(SplitStrategy::Percentage);
        ledger.add_participant("Ana", "ana@example.com");
        ledger.add_participant("Ben", "ben@example.com");
        ledger.set_percentage(0, 33.33).unwrap();
        ledger.set_percentage(1, 33.33).unwrap();
        ledger.set_percentage(2, 33.34).unwrap();

        // 333.30 + 333.30 + 333.40 = 1000.00
        assert!(ledger.is_balanced());
        assert!(ledger.confirm().is_ok());
    }

    #[test]
    fn unbalanced_split_cannot_confirm() {
        let mut ledger = ledger(1000);
        ledger.set_strategy(SplitStrategy::Custom);
        ledger.set_amount(0, Money::from_major(400)).unwrap();
        match ledger.confirm() {
            Err(SplitError::Unbalanced { difference }) => {
                assert_eq!(difference, Money::from_major(-600));
            }
            other => panic!("expected unbalanced, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_invite_leaves_participant_pending() {
        let mut ledger = ledger(600);
        ledger.add_participant("Ana", "ana@example.com");
        ledger.add_participant("Ben", "ben@example.com");

        let dispatch = FlakyDispatch {
            fail_for: "ben@example.com".into(),
        };

        let ok = ledger.invite(1, &dispatch).await.unwrap();
        assert_eq!(ok, InviteOutcome::Invited);
        assert_eq!(ledger.participants()[1].status, ParticipantStatus::Invited);

        let failed = ledger.invite(2, &dispatch).await.unwrap();
        assert!(matches!(failed, InviteOutcome::Failed { .. }));
        assert_eq!(ledger.participants()[2].status, ParticipantStatus::Pending);
    }
}
