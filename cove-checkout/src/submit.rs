use crate::addons::AddonLedger;
use crate::machine::{BookingStepMachine, MachineError};
use crate::plans::PaymentPlanCalculator;
use cove_core::payment::{PaymentInstruction, PaymentToken};
use cove_core::reservation::{
    InsuranceCharge, ReservationApi, ReservationError, ReservationRequest, SignatureRecord,
};
use cove_core::single_flight::SingleFlight;
use std::sync::Arc;

/// Every submission branch, made explicit so callers handle each one. The
/// draft is left untouched on all failures except an availability conflict,
/// which pushes the machine back to date selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Confirmed { reservation_id: String },
    /// Reselect dates; the stale quote has been dropped.
    DatesUnavailable,
    /// Transient failure. Retry is user-initiated only.
    RetryableFailure { message: String },
    /// The collaborator rejected the booking outright.
    Rejected { message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("A submission for this draft is already in flight")]
    SubmissionInFlight,

    #[error(transparent)]
    NotReady(#[from] MachineError),
}

/// Terminal action of the checkout: sends the assembled draft to the
/// reservation-creation collaborator, exactly once at a time per draft.
pub struct ReservationSubmitter {
    api: Arc<dyn ReservationApi>,
    flights: SingleFlight,
    plans: PaymentPlanCalculator,
}

impl ReservationSubmitter {
    pub fn new(api: Arc<dyn ReservationApi>) -> Self {
        Self::with_parts(api, SingleFlight::new(), PaymentPlanCalculator::default())
    }

    pub fn with_parts(
        api: Arc<dyn ReservationApi>,
        flights: SingleFlight,
        plans: PaymentPlanCalculator,
    ) -> Self {
        Self {
            api,
            flights,
            plans,
        }
    }

    pub fn single_flight(&self) -> &SingleFlight {
        &self.flights
    }

    pub async fn submit(
        &self,
        machine: &mut BookingStepMachine,
        token: PaymentToken,
    ) -> Result<SubmitOutcome, SubmitError> {
        machine.ready_for_submission()?;

        let draft_id = machine.draft().id;
        let _guard = self
            .flights
            .begin(draft_id)
            .ok_or(SubmitError::SubmissionInFlight)?;

        let request = self.assemble(machine, token)?;
        tracing::info!(draft = %draft_id, amount = %request.payment.amount_due_now, "submitting reservation");

        match self.api.create_reservation(&request).await {
            Ok(confirmation) => {
                tracing::info!(draft = %draft_id, reservation = %confirmation.reservation_id, "reservation confirmed");
                Ok(SubmitOutcome::Confirmed {
                    reservation_id: confirmation.reservation_id,
                })
            }
            Err(ReservationError::DatesUnavailable) => {
                machine.handle_availability_conflict();
                Ok(SubmitOutcome::DatesUnavailable)
            }
            Err(err @ ReservationError::Transport(_)) => {
                tracing::warn!(draft = %draft_id, error = %err, "submission failed; draft preserved for retry");
                Ok(SubmitOutcome::RetryableFailure {
                    message: err.to_string(),
                })
            }
            Err(err @ ReservationError::Rejected(_)) => Ok(SubmitOutcome::Rejected {
                message: err.to_string(),
            }),
        }
    }

    fn assemble(
        &self,
        machine: &BookingStepMachine,
        token: PaymentToken,
    ) -> Result<ReservationRequest, MachineError> {
        let draft = machine.draft();
        let quote = draft.quote.as_ref().ok_or(MachineError::QuoteRequired)?;
        let breakdown = machine.breakdown()?;
        let agreement = draft.agreement.as_ref().ok_or_else(|| {
            MachineError::StepIncomplete {
                step: crate::machine::CheckoutStep::Agreement,
                reason: "the lease agreement must be signed".to_string(),
            }
        })?;

        let addons =
            AddonLedger::new(machine.catalog()).charges(&draft.addon_selections, quote.nights)?;
        let insurance = draft.insurance.as_ref().map(|plan| InsuranceCharge {
            plan_id: plan.id.clone(),
            premium: breakdown.insurance_total,
        });
        let schedule = self.plans.schedule(breakdown.grand_total, draft.payment_option);

        Ok(ReservationRequest {
            property_id: draft.property_id,
            check_in: quote.check_in,
            check_out: quote.check_out,
            party: draft.party,
            guest: draft.guest.clone(),
            addons,
            insurance,
            agreement: SignatureRecord {
                signature: agreement.signature.clone(),
                accepted_addendum_ids: agreement.accepted_addendum_ids.clone(),
                signed_at: agreement.signed_at,
            },
            payment: PaymentInstruction {
                token,
                amount_due_now: schedule.due_now,
                option: draft.payment_option,
            },
            grand_total: breakdown.grand_total,
        })
    }
}
