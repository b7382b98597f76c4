use cove_core::payment::PaymentOption;
use cove_shared::app_config::BookingRules;
use cove_shared::Money;
use serde::{Deserialize, Serialize};

/// Amount charged now plus the remaining installments. Due dates for the
/// remaining charges are owned by the external reservation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentSchedule {
    pub option: PaymentOption,
    pub due_now: Money,
    pub remaining: Vec<Money>,
}

impl PaymentSchedule {
    /// Always equals the grand total the schedule was built from.
    pub fn total(&self) -> Money {
        self.due_now + self.remaining.iter().copied().sum::<Money>()
    }
}

#[derive(Debug, Clone)]
pub struct PaymentPlanCalculator {
    deposit_fraction: f64,
}

impl Default for PaymentPlanCalculator {
    fn default() -> Self {
        Self {
            deposit_fraction: 0.5,
        }
    }
}

impl PaymentPlanCalculator {
    pub fn from_rules(rules: &BookingRules) -> Self {
        Self {
            deposit_fraction: rules.deposit_fraction,
        }
    }

    /// Sized installments sum exactly to `grand_total`: each non-final amount
    /// is rounded half-up and the final installment absorbs the remainder.
    pub fn schedule(&self, grand_total: Money, option: PaymentOption) -> PaymentSchedule {
        let (due_now, remaining) = match option {
            PaymentOption::Full => (grand_total, Vec::new()),
            PaymentOption::Deposit => {
                let deposit = grand_total.apply_rate(self.deposit_fraction);
                (deposit, vec![grand_total - deposit])
            }
            PaymentOption::Split3 => {
                let installment = grand_total.div_round(3);
                (
                    installment,
                    vec![installment, grand_total - installment - installment],
                )
            }
        };

        PaymentSchedule {
            option,
            due_now,
            remaining,
        }
    }
}
