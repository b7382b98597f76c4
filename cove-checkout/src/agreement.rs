use crate::models::Addendum;
use cove_core::property::{Amenity, Property};
use cove_core::reservation::PartyComposition;

pub const POOL_HOT_TUB_ADDENDUM: &str = "pool-hot-tub-rules";
pub const PET_POLICY_ADDENDUM: &str = "pet-policy";

#[derive(Debug, thiserror::Error)]
pub enum AgreementError {
    #[error("A signature is required")]
    SignatureRequired,

    #[error("Required addendum not acknowledged: {0}")]
    MissingAddendum(String),
}

/// Lease addenda for the current property and party. Pure; called fresh on
/// every (re-)entry of the agreement step so a stale list can never be
/// signed.
///
/// The pool/hot-tub addendum applies only when the property has the amenity
/// and the party brings no pets; pet parties get the pet policy instead.
pub fn compute_addenda(property: &Property, party: &PartyComposition) -> Vec<Addendum> {
    let mut addenda = Vec::new();

    let has_water_feature =
        property.has_amenity(&Amenity::Pool) || property.has_amenity(&Amenity::HotTub);
    if has_water_feature && party.pets == 0 {
        addenda.push(Addendum {
            id: POOL_HOT_TUB_ADDENDUM.to_string(),
            title: "Pool & Hot Tub Rules".to_string(),
            required: true,
        });
    }

    if party.pets > 0 {
        addenda.push(Addendum {
            id: PET_POLICY_ADDENDUM.to_string(),
            title: "Pet Policy".to_string(),
            required: true,
        });
    }

    addenda
}

/// Checks that every required addendum id is acknowledged.
pub fn validate_acknowledgements(
    addenda: &[Addendum],
    accepted_ids: &[String],
) -> Result<(), AgreementError> {
    for addendum in addenda.iter().filter(|a| a.required) {
        if !accepted_ids.contains(&addendum.id) {
            return Err(AgreementError::MissingAddendum(addendum.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn property(amenities: Vec<Amenity>) -> Property {
        Property {
            id: Uuid::new_v4(),
            slug: "sunset-cove".into(),
            name: "Sunset Cove".into(),
            amenities,
            min_stay_nights: 3,
        }
    }

    fn party(pets: u32) -> PartyComposition {
        PartyComposition {
            adults: 2,
            children: 0,
            pets,
        }
    }

    #[test]
    fn pool_property_without_pets_requires_pool_addendum() {
        let addenda = compute_addenda(&property(vec![Amenity::Pool]), &party(0));
        assert_eq!(addenda.len(), 1);
        assert_eq!(addenda[0].id, POOL_HOT_TUB_ADDENDUM);
        assert!(addenda[0].required);
    }

    #[test]
    fn pets_swap_pool_rules_for_pet_policy() {
        let addenda = compute_addenda(&property(vec![Amenity::HotTub]), &party(1));
        assert_eq!(addenda.len(), 1);
        assert_eq!(addenda[0].id, PET_POLICY_ADDENDUM);
    }

    #[test]
    fn no_amenities_no_pets_no_addenda() {
        let addenda = compute_addenda(&property(vec![Amenity::Wifi]), &party(0));
        assert!(addenda.is_empty());
    }

    #[test]
    fn unacknowledged_required_addendum_fails_validation() {
        let addenda = compute_addenda(&property(vec![Amenity::Pool]), &party(0));
        let err = validate_acknowledgements(&addenda, &[]);
        assert!(matches!(err, Err(AgreementError::MissingAddendum(id)) if id == POOL_HOT_TUB_ADDENDUM));

        let accepted = vec![POOL_HOT_TUB_ADDENDUM.to_string()];
        assert!(validate_acknowledgements(&addenda, &accepted).is_ok());
    }
}
