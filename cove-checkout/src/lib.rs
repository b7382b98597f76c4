pub mod addons;
pub mod agreement;
pub mod machine;
pub mod models;
pub mod plans;
pub mod protection;
pub mod split;
pub mod submit;
pub mod totals;

pub use addons::{AddonError, AddonLedger};
pub use machine::{BookingStepMachine, CheckoutStep, MachineError};
pub use models::{
    Addendum, Addon, AddonPricing, AddonSelection, Agreement, BookingDraft, DateRange,
    InsurancePlan, TermsFingerprint,
};
pub use plans::{PaymentPlanCalculator, PaymentSchedule};
pub use split::{ParticipantStatus, SplitError, SplitLedger, SplitParticipant, SplitStrategy};
pub use submit::{ReservationSubmitter, SubmitError, SubmitOutcome};
pub use totals::PriceBreakdown;
