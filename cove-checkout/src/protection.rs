use crate::models::InsurancePlan;
use cove_shared::Money;

/// Trip-protection premium: a fraction of the quoted trip total, rounded to
/// the nearest whole currency unit. Every other line item stays at minor-unit
/// precision until display.
pub fn premium(trip_total: Money, plan: &InsurancePlan) -> Money {
    trip_total.apply_rate(plan.premium_rate).round_to_major()
}

/// Zero when no plan is selected.
pub fn premium_for(trip_total: Money, plan: Option<&InsurancePlan>) -> Money {
    plan.map(|p| premium(trip_total, p)).unwrap_or(Money::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(rate: f64) -> InsurancePlan {
        InsurancePlan {
            id: "standard".into(),
            name: "Standard protection".into(),
            premium_rate: rate,
        }
    }

    #[test]
    fn premium_is_rate_of_total_rounded_to_major() {
        // 7% of $1234.56 = $86.4192 -> $86
        assert_eq!(
            premium(Money::from_minor(123_456), &plan(0.07)),
            Money::from_major(86)
        );
        // 7% of $1250.00 = $87.50 -> $88 (half-up)
        assert_eq!(
            premium(Money::from_major(1250), &plan(0.07)),
            Money::from_major(88)
        );
    }

    #[test]
    fn no_plan_means_no_premium() {
        assert_eq!(premium_for(Money::from_major(1000), None), Money::ZERO);
    }
}
