use crate::addons::{AddonError, AddonLedger};
use crate::agreement::{self, AgreementError};
use crate::models::{
    Addendum, Addon, AddonSelection, Agreement, BookingDraft, DateRange, InsurancePlan,
    TermsFingerprint,
};
use crate::totals::{self, PriceBreakdown};
use chrono::Utc;
use cove_core::payment::PaymentOption;
use cove_core::property::{Property, PropertyError, PropertyLookup};
use cove_core::quote::{PricingQuote, QuoteError, QuoteService};
use cove_core::reservation::{GuestInfo, PartyComposition};
use cove_shared::Money;
use serde::{Deserialize, Serialize};

/// Checkout steps in strict forward order. `Payment` is the terminal step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutStep {
    Dates,
    Addons,
    Guests,
    Protection,
    Agreement,
    Payment,
}

impl CheckoutStep {
    pub const ORDER: [CheckoutStep; 6] = [
        CheckoutStep::Dates,
        CheckoutStep::Addons,
        CheckoutStep::Guests,
        CheckoutStep::Protection,
        CheckoutStep::Agreement,
        CheckoutStep::Payment,
    ];

    pub fn index(self) -> usize {
        Self::ORDER.iter().position(|s| *s == self).expect("listed")
    }

    fn next(self) -> Option<CheckoutStep> {
        Self::ORDER.get(self.index() + 1).copied()
    }

    fn prev(self) -> Option<CheckoutStep> {
        self.index().checked_sub(1).map(|i| Self::ORDER[i])
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MachineError {
    #[error("Stay of {nights} nights is below the {min_stay}-night minimum")]
    StayTooShort { nights: u32, min_stay: u32 },

    #[error("Quote does not match the selected date range")]
    QuoteMismatch,

    #[error("A pricing quote is required first")]
    QuoteRequired,

    #[error("Step {step:?} is not complete: {reason}")]
    StepIncomplete { step: CheckoutStep, reason: String },

    #[error("Cannot jump forward from {from:?} to {to:?}")]
    ForwardJumpNotAllowed {
        from: CheckoutStep,
        to: CheckoutStep,
    },

    #[error("Already at the first step")]
    AtFirstStep,

    #[error("Already at the final step")]
    AtLastStep,

    #[error("Not at the payment step (currently {step:?})")]
    NotAtPayment { step: CheckoutStep },

    #[error(transparent)]
    Addon(#[from] AddonError),

    #[error(transparent)]
    Agreement(#[from] AgreementError),

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error(transparent)]
    Quote(#[from] QuoteError),
}

/// Sequences one checkout session: forward progress is gated on the current
/// step's completion predicate, backward movement is always allowed and never
/// clears entered data. Owns the [`BookingDraft`] and is the only writer to
/// it.
pub struct BookingStepMachine {
    property: Property,
    catalog: Vec<Addon>,
    draft: BookingDraft,
    step: CheckoutStep,
}

impl BookingStepMachine {
    pub fn new(property: Property, catalog: Vec<Addon>) -> Self {
        let draft = BookingDraft::new(property.id);
        Self {
            property,
            catalog,
            draft,
            step: CheckoutStep::Dates,
        }
    }

    /// Enters a checkout by resolving the property through the external
    /// catalog collaborator.
    pub async fn for_slug(
        lookup: &dyn PropertyLookup,
        slug: &str,
        catalog: Vec<Addon>,
    ) -> Result<Self, MachineError> {
        let property = lookup.get_property(slug).await?;
        Ok(Self::new(property, catalog))
    }

    pub fn current_step(&self) -> CheckoutStep {
        self.step
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn property(&self) -> &Property {
        &self.property
    }

    pub fn catalog(&self) -> &[Addon] {
        &self.catalog
    }

    // ---- step mutators -----------------------------------------------------

    /// Records the authoritative quote for a date range, replacing any
    /// previous quote wholesale.
    pub fn record_quote(
        &mut self,
        range: DateRange,
        quote: PricingQuote,
    ) -> Result<(), MachineError> {
        let nights = range.nights();
        if nights < self.property.min_stay_nights {
            return Err(MachineError::StayTooShort {
                nights,
                min_stay: self.property.min_stay_nights,
            });
        }
        if quote.check_in != range.check_in()
            || quote.check_out != range.check_out()
            || quote.nights != nights
        {
            return Err(MachineError::QuoteMismatch);
        }

        tracing::debug!(nights, total = %quote.total, "quote recorded");
        self.draft.dates = Some(range);
        self.draft.quote = Some(quote);
        self.sweep_signature();
        Ok(())
    }

    /// Fetches the authoritative quote from the pricing collaborator and
    /// records it. Stays below the minimum never reach the network; an
    /// unavailable range surfaces as an error and leaves the flow on the
    /// dates step so the guest can reselect.
    pub async fn fetch_quote(
        &mut self,
        service: &dyn QuoteService,
        range: DateRange,
    ) -> Result<(), MachineError> {
        let nights = range.nights();
        if nights < self.property.min_stay_nights {
            return Err(MachineError::StayTooShort {
                nights,
                min_stay: self.property.min_stay_nights,
            });
        }

        let quote = service
            .get_quote(self.property.id, range.check_in(), range.check_out())
            .await?;
        self.record_quote(range, quote)
    }

    /// Quantity 0 removes the selection; otherwise it is upserted.
    pub fn select_addon(&mut self, addon_id: &str, quantity: u32) -> Result<(), MachineError> {
        AddonLedger::new(&self.catalog).resolve(addon_id)?;

        self.draft
            .addon_selections
            .retain(|s| s.addon_id != addon_id);
        if quantity > 0 {
            self.draft.addon_selections.push(AddonSelection {
                addon_id: addon_id.to_string(),
                quantity,
            });
        }
        self.sweep_signature();
        Ok(())
    }

    pub fn set_guest_info(&mut self, guest: GuestInfo) {
        self.draft.guest = guest;
        self.sweep_signature();
    }

    pub fn set_party(&mut self, party: PartyComposition) {
        self.draft.party = party;
        self.sweep_signature();
    }

    /// Selecting a plan while another is selected replaces it.
    pub fn select_protection(&mut self, plan: InsurancePlan) {
        self.draft.insurance = Some(plan);
        self.sweep_signature();
    }

    /// Declining protection is a valid choice.
    pub fn decline_protection(&mut self) {
        self.draft.insurance = None;
        self.sweep_signature();
    }

    pub fn set_payment_option(&mut self, option: PaymentOption) {
        self.draft.payment_option = option;
    }

    /// Addenda for the current property and party, computed fresh.
    pub fn addenda(&self) -> Vec<Addendum> {
        agreement::compute_addenda(&self.property, &self.draft.party)
    }

    /// Captures a signature over the current terms. The acknowledgement list
    /// is validated against a freshly computed addendum set.
    pub fn sign_agreement(
        &mut self,
        signature: &str,
        accepted_addendum_ids: Vec<String>,
    ) -> Result<(), MachineError> {
        if signature.trim().is_empty() {
            return Err(AgreementError::SignatureRequired.into());
        }
        let terms = self
            .current_fingerprint()
            .ok_or(MachineError::QuoteRequired)?;
        agreement::validate_acknowledgements(&self.addenda(), &accepted_addendum_ids)?;

        tracing::info!(draft = %self.draft.id, "agreement signed");
        self.draft.agreement = Some(Agreement {
            signature: signature.to_string(),
            accepted_addendum_ids,
            signed_at: Utc::now(),
            terms,
        });
        Ok(())
    }

    // ---- derived pricing ---------------------------------------------------

    /// The centralized price breakdown; always recomputed, never cached.
    pub fn breakdown(&self) -> Result<PriceBreakdown, MachineError> {
        let quote = self.draft.quote.as_ref().ok_or(MachineError::QuoteRequired)?;
        totals::price_breakdown(
            quote,
            &self.draft.addon_selections,
            &self.catalog,
            self.draft.insurance.as_ref(),
        )
        .map_err(Into::into)
    }

    pub fn grand_total(&self) -> Result<Money, MachineError> {
        Ok(self.breakdown()?.grand_total)
    }

    // ---- transitions -------------------------------------------------------

    /// Whether a step's completion predicate currently holds.
    pub fn step_complete(&self, step: CheckoutStep) -> Result<(), MachineError> {
        let incomplete = |reason: &str| MachineError::StepIncomplete {
            step,
            reason: reason.to_string(),
        };

        match step {
            CheckoutStep::Dates => {
                if self.draft.quote.is_none() {
                    return Err(incomplete("no pricing quote for the selected dates"));
                }
            }
            CheckoutStep::Addons => {} // empty selection is valid
            CheckoutStep::Guests => {
                if !self.draft.guest.is_complete() {
                    return Err(incomplete("guest email and identity fields are required"));
                }
            }
            CheckoutStep::Protection => {} // declining is valid
            CheckoutStep::Agreement => match &self.draft.agreement {
                None => return Err(incomplete("the lease agreement must be signed")),
                Some(a) if self.current_fingerprint() != Some(a.terms) => {
                    return Err(incomplete("the signature no longer covers the current terms"))
                }
                Some(_) => {}
            },
            CheckoutStep::Payment => {} // submission validates itself
        }
        Ok(())
    }

    /// Advances one step iff the current step is complete.
    pub fn advance(&mut self) -> Result<CheckoutStep, MachineError> {
        self.step_complete(self.step)?;
        let next = self.step.next().ok_or(MachineError::AtLastStep)?;
        tracing::debug!(from = ?self.step, to = ?next, "step advanced");
        self.step = next;
        Ok(next)
    }

    /// Retreats one step unconditionally. Entered data is retained; the step
    /// re-populates from the draft on re-entry.
    pub fn back(&mut self) -> Result<CheckoutStep, MachineError> {
        let prev = self.step.prev().ok_or(MachineError::AtFirstStep)?;
        self.step = prev;
        Ok(prev)
    }

    /// Breadcrumb navigation: only steps strictly before the current one are
    /// reachable, even if later steps already hold data.
    pub fn jump_to(&mut self, target: CheckoutStep) -> Result<CheckoutStep, MachineError> {
        if target >= self.step {
            return Err(MachineError::ForwardJumpNotAllowed {
                from: self.step,
                to: target,
            });
        }
        self.step = target;
        Ok(target)
    }

    /// The dates were taken between quote and submission: drop the stale
    /// quote and force the flow back to date selection.
    pub fn handle_availability_conflict(&mut self) {
        tracing::warn!(draft = %self.draft.id, "dates no longer available; returning to date selection");
        self.draft.quote = None;
        self.sweep_signature();
        self.step = CheckoutStep::Dates;
    }

    /// Preconditions for handing the draft to the submitter.
    pub fn ready_for_submission(&self) -> Result<(), MachineError> {
        if self.step != CheckoutStep::Payment {
            return Err(MachineError::NotAtPayment { step: self.step });
        }
        self.step_complete(CheckoutStep::Guests)?;
        self.step_complete(CheckoutStep::Agreement)?;
        self.breakdown().map(|_| ())
    }

    // ---- internals ---------------------------------------------------------

    fn current_fingerprint(&self) -> Option<TermsFingerprint> {
        let dates = self.draft.dates?;
        let grand_total = self.breakdown().ok()?.grand_total;
        Some(TermsFingerprint {
            check_in: dates.check_in(),
            check_out: dates.check_out(),
            pets: self.draft.party.pets,
            grand_total,
        })
    }

    /// A signature covers the terms it was captured against. Any mutation
    /// that shifts dates, pet count, or the grand total drops it.
    fn sweep_signature(&mut self) {
        if let Some(signed_terms) = self.draft.agreement.as_ref().map(|a| a.terms) {
            if self.current_fingerprint() != Some(signed_terms) {
                tracing::debug!(draft = %self.draft.id, "terms changed after signing; signature invalidated");
                self.draft.agreement = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AddonPricing;
    use chrono::NaiveDate;
    use cove_core::property::Amenity;
    use cove_core::quote::NightlyRate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn property() -> Property {
        Property {
            id: Uuid::new_v4(),
            slug: "sunset-cove".into(),
            name: "Sunset Cove".into(),
            amenities: vec![Amenity::Pool, Amenity::Wifi],
            min_stay_nights: 3,
        }
    }

    fn catalog() -> Vec<Addon> {
        vec![
            Addon {
                id: "early-checkin".into(),
                name: "Early check-in".into(),
                price: Money::from_major(50),
                pricing: AddonPricing::Flat,
            },
            Addon {
                id: "firewood".into(),
                name: "Firewood bundle".into(),
                price: Money::from_major(15),
                pricing: AddonPricing::PerNight,
            },
        ]
    }

    fn quote_for(
        property_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        nightly_major: i64,
    ) -> PricingQuote {
        let nights = (check_out - check_in).num_days() as u32;
        let nightly = (0..nights)
            .map(|i| NightlyRate {
                date: check_in + chrono::Days::new(i as u64),
                amount: Money::from_major(nightly_major),
            })
            .collect();
        let subtotal = Money::from_major(nightly_major * nights as i64);
        PricingQuote {
            property_id,
            check_in,
            check_out,
            nights,
            nightly,
            subtotal,
            fees: Money::ZERO,
            taxes: Money::ZERO,
            total: subtotal,
        }
    }

    fn guest() -> GuestInfo {
        GuestInfo {
            first_name: "Jordan".into(),
            last_name: "Reyes".into(),
            email: "jordan@example.com".into(),
            phone: "".into(),
        }
    }

    fn machine_with_quote() -> BookingStepMachine {
        let mut machine = BookingStepMachine::new(property(), catalog());
        let range = DateRange::new(date(2025, 6, 2), date(2025, 6, 6)).unwrap();
        let quote = quote_for(
            machine.property().id,
            range.check_in(),
            range.check_out(),
            250,
        );
        machine.record_quote(range, quote).unwrap();
        machine
    }

    fn sign(machine: &mut BookingStepMachine) {
        let accepted = machine.addenda().into_iter().map(|a| a.id).collect();
        machine.sign_agreement("Jordan Reyes", accepted).unwrap();
    }

    #[test]
    fn cannot_advance_past_dates_without_a_quote() {
        let mut machine = BookingStepMachine::new(property(), catalog());
        assert!(matches!(
            machine.advance(),
            Err(MachineError::StepIncomplete {
                step: CheckoutStep::Dates,
                ..
            })
        ));
    }

    #[test]
    fn stay_below_minimum_is_rejected() {
        let mut machine = BookingStepMachine::new(property(), catalog());
        let range = DateRange::new(date(2025, 6, 2), date(2025, 6, 4)).unwrap();
        let quote = quote_for(
            machine.property().id,
            range.check_in(),
            range.check_out(),
            250,
        );
        assert!(matches!(
            machine.record_quote(range, quote),
            Err(MachineError::StayTooShort {
                nights: 2,
                min_stay: 3
            })
        ));
    }

    #[test]
    fn quote_must_match_the_range() {
        let mut machine = BookingStepMachine::new(property(), catalog());
        let range = DateRange::new(date(2025, 6, 2), date(2025, 6, 6)).unwrap();
        let other = quote_for(machine.property().id, date(2025, 6, 3), date(2025, 6, 7), 250);
        assert!(matches!(
            machine.record_quote(range, other),
            Err(MachineError::QuoteMismatch)
        ));
    }

    #[test]
    fn full_walk_reaches_payment() {
        let mut machine = machine_with_quote();
        assert_eq!(machine.advance().unwrap(), CheckoutStep::Addons);
        machine.select_addon("early-checkin", 1).unwrap();
        assert_eq!(machine.advance().unwrap(), CheckoutStep::Guests);
        machine.set_guest_info(guest());
        assert_eq!(machine.advance().unwrap(), CheckoutStep::Protection);
        assert_eq!(machine.advance().unwrap(), CheckoutStep::Agreement);
        sign(&mut machine);
        assert_eq!(machine.advance().unwrap(), CheckoutStep::Payment);
        assert!(machine.ready_for_submission().is_ok());
    }

    #[test]
    fn payment_is_unreachable_without_a_signature() {
        let mut machine = machine_with_quote();
        machine.advance().unwrap(); // Addons
        machine.advance().unwrap(); // Guests
        machine.set_guest_info(guest());
        machine.advance().unwrap(); // Protection
        machine.advance().unwrap(); // Agreement
        assert!(matches!(
            machine.advance(),
            Err(MachineError::StepIncomplete {
                step: CheckoutStep::Agreement,
                ..
            })
        ));
    }

    #[test]
    fn missing_required_addendum_blocks_signing() {
        let mut machine = machine_with_quote();
        let err = machine.sign_agreement("Jordan Reyes", vec![]);
        assert!(matches!(
            err,
            Err(MachineError::Agreement(AgreementError::MissingAddendum(_)))
        ));
    }

    #[test]
    fn breadcrumb_cannot_skip_forward() {
        let mut machine = machine_with_quote();
        machine.advance().unwrap(); // Addons
        assert!(matches!(
            machine.jump_to(CheckoutStep::Agreement),
            Err(MachineError::ForwardJumpNotAllowed { .. })
        ));
        assert_eq!(machine.jump_to(CheckoutStep::Dates).unwrap(), CheckoutStep::Dates);
    }

    #[test]
    fn going_back_retains_entered_data() {
        let mut machine = machine_with_quote();
        machine.advance().unwrap();
        machine.select_addon("firewood", 2).unwrap();
        machine.back().unwrap();
        assert_eq!(machine.current_step(), CheckoutStep::Dates);
        assert_eq!(machine.draft().addon_selections.len(), 1);
        assert!(machine.draft().quote.is_some());
    }

    #[test]
    fn grand_total_composes_all_lines() {
        let mut machine = machine_with_quote(); // 4 nights x $250
        machine.select_addon("firewood", 1).unwrap(); // $15 x 4
        machine.select_protection(InsurancePlan {
            id: "standard".into(),
            name: "Standard protection".into(),
            premium_rate: 0.1,
        }); // 10% of $1000 -> $100
        assert_eq!(machine.grand_total().unwrap(), Money::from_major(1160));
    }

    #[test]
    fn new_dates_invalidate_the_signature() {
        let mut machine = machine_with_quote();
        sign(&mut machine);
        assert!(machine.draft().agreement.is_some());

        let range = DateRange::new(date(2025, 6, 9), date(2025, 6, 13)).unwrap();
        let quote = quote_for(
            machine.property().id,
            range.check_in(),
            range.check_out(),
            250,
        );
        machine.record_quote(range, quote).unwrap();
        assert!(machine.draft().agreement.is_none());
        assert!(machine.step_complete(CheckoutStep::Agreement).is_err());
    }

    #[test]
    fn total_change_invalidates_the_signature() {
        let mut machine = machine_with_quote();
        sign(&mut machine);
        machine.select_addon("early-checkin", 1).unwrap();
        assert!(machine.draft().agreement.is_none());
    }

    #[test]
    fn pet_count_change_invalidates_and_regenerates_addenda() {
        let mut machine = machine_with_quote();
        sign(&mut machine);

        machine.set_party(PartyComposition {
            adults: 2,
            children: 0,
            pets: 1,
        });
        assert!(machine.draft().agreement.is_none());
        // Pool rules drop out, pet policy comes in.
        let ids: Vec<String> = machine.addenda().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![agreement::PET_POLICY_ADDENDUM.to_string()]);
    }

    #[test]
    fn guest_contact_change_keeps_the_signature() {
        let mut machine = machine_with_quote();
        sign(&mut machine);
        machine.set_guest_info(guest());
        assert!(machine.draft().agreement.is_some());
    }

    #[test]
    fn availability_conflict_forces_back_to_dates() {
        let mut machine = machine_with_quote();
        machine.advance().unwrap();
        machine.advance().unwrap();
        machine.handle_availability_conflict();
        assert_eq!(machine.current_step(), CheckoutStep::Dates);
        assert!(machine.draft().quote.is_none());
        assert!(machine.step_complete(CheckoutStep::Dates).is_err());
    }

    #[test]
    fn selecting_a_second_plan_replaces_the_first() {
        let mut machine = machine_with_quote();
        machine.select_protection(InsurancePlan {
            id: "basic".into(),
            name: "Basic".into(),
            premium_rate: 0.05,
        });
        machine.select_protection(InsurancePlan {
            id: "plus".into(),
            name: "Plus".into(),
            premium_rate: 0.12,
        });
        let breakdown = machine.breakdown().unwrap();
        assert_eq!(breakdown.insurance_total, Money::from_major(120));
    }
}
