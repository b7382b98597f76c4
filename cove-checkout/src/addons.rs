use crate::models::{Addon, AddonPricing, AddonSelection};
use cove_core::reservation::AddonCharge;
use cove_shared::Money;

#[derive(Debug, thiserror::Error)]
pub enum AddonError {
    #[error("Unknown add-on: {0}")]
    Unknown(String),
}

/// Resolves selected add-ons against the externally supplied catalog and
/// prices their line totals for a stay of a given length.
pub struct AddonLedger<'a> {
    catalog: &'a [Addon],
}

impl<'a> AddonLedger<'a> {
    pub fn new(catalog: &'a [Addon]) -> Self {
        Self { catalog }
    }

    pub fn resolve(&self, addon_id: &str) -> Result<&'a Addon, AddonError> {
        self.catalog
            .iter()
            .find(|a| a.id == addon_id)
            .ok_or_else(|| AddonError::Unknown(addon_id.to_string()))
    }

    /// unit price x quantity, x nights for per-night add-ons.
    pub fn line_total(&self, selection: &AddonSelection, nights: u32) -> Result<Money, AddonError> {
        let addon = self.resolve(&selection.addon_id)?;
        let night_factor = match addon.pricing {
            AddonPricing::Flat => 1,
            AddonPricing::PerNight => nights as i64,
        };
        Ok(Money::from_minor(
            addon.price.minor() * selection.quantity as i64 * night_factor,
        ))
    }

    pub fn total(&self, selections: &[AddonSelection], nights: u32) -> Result<Money, AddonError> {
        let mut total = Money::ZERO;
        for selection in selections {
            total += self.line_total(selection, nights)?;
        }
        Ok(total)
    }

    /// Priced line items for the reservation request.
    pub fn charges(
        &self,
        selections: &[AddonSelection],
        nights: u32,
    ) -> Result<Vec<AddonCharge>, AddonError> {
        selections
            .iter()
            .map(|selection| {
                Ok(AddonCharge {
                    addon_id: selection.addon_id.clone(),
                    quantity: selection.quantity,
                    line_total: self.line_total(selection, nights)?,
                })
            })
            .collect()
    }
}
