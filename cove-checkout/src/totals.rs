use crate::addons::{AddonError, AddonLedger};
use crate::models::{Addon, AddonSelection, InsurancePlan};
use crate::protection;
use cove_core::quote::PricingQuote;
use cove_shared::Money;
use serde::{Deserialize, Serialize};

/// The one place the chargeable total is computed. Derived fresh from its
/// inputs every time; there is no cached accumulator anywhere in the engine,
/// so displayed and charged amounts cannot drift apart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub stay_total: Money,
    pub addons_total: Money,
    pub insurance_total: Money,
    pub grand_total: Money,
}

pub fn price_breakdown(
    quote: &PricingQuote,
    selections: &[AddonSelection],
    catalog: &[Addon],
    insurance: Option<&InsurancePlan>,
) -> Result<PriceBreakdown, AddonError> {
    let ledger = AddonLedger::new(catalog);
    let stay_total = quote.total;
    let addons_total = ledger.total(selections, quote.nights)?;
    let insurance_total = protection::premium_for(stay_total, insurance);

    Ok(PriceBreakdown {
        stay_total,
        addons_total,
        insurance_total,
        grand_total: stay_total + addons_total + insurance_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AddonPricing;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn quote(total_major: i64, nights: u32) -> PricingQuote {
        PricingQuote {
            property_id: Uuid::new_v4(),
            check_in: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2025, 6, 1 + nights).unwrap(),
            nights,
            nightly: Vec::new(),
            subtotal: Money::from_major(total_major),
            fees: Money::ZERO,
            taxes: Money::ZERO,
            total: Money::from_major(total_major),
        }
    }

    fn catalog() -> Vec<Addon> {
        vec![Addon {
            id: "firewood".into(),
            name: "Firewood bundle".into(),
            price: Money::from_major(15),
            pricing: AddonPricing::PerNight,
        }]
    }

    #[test]
    fn breakdown_composes_stay_addons_and_insurance() {
        let selections = vec![AddonSelection {
            addon_id: "firewood".into(),
            quantity: 1,
        }];
        let plan = InsurancePlan {
            id: "standard".into(),
            name: "Standard protection".into(),
            premium_rate: 0.1,
        };

        let breakdown =
            price_breakdown(&quote(1000, 4), &selections, &catalog(), Some(&plan)).unwrap();
        assert_eq!(breakdown.stay_total, Money::from_major(1000));
        assert_eq!(breakdown.addons_total, Money::from_major(60));
        assert_eq!(breakdown.insurance_total, Money::from_major(100));
        assert_eq!(breakdown.grand_total, Money::from_major(1160));
    }

    #[test]
    fn breakdown_is_idempotent() {
        let selections = vec![AddonSelection {
            addon_id: "firewood".into(),
            quantity: 2,
        }];
        let q = quote(875, 3);
        let first = price_breakdown(&q, &selections, &catalog(), None).unwrap();
        let second = price_breakdown(&q, &selections, &catalog(), None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn insurance_reflects_only_the_selected_plan() {
        let cheap = InsurancePlan {
            id: "basic".into(),
            name: "Basic".into(),
            premium_rate: 0.05,
        };
        let rich = InsurancePlan {
            id: "plus".into(),
            name: "Plus".into(),
            premium_rate: 0.12,
        };

        let q = quote(1000, 2);
        let with_cheap = price_breakdown(&q, &[], &catalog(), Some(&cheap)).unwrap();
        let with_rich = price_breakdown(&q, &[], &catalog(), Some(&rich)).unwrap();
        assert_eq!(with_cheap.insurance_total, Money::from_major(50));
        assert_eq!(with_rich.insurance_total, Money::from_major(120));
    }
}
