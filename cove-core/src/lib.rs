pub mod invite;
pub mod payment;
pub mod property;
pub mod quote;
pub mod reservation;
pub mod single_flight;

pub use invite::{InviteDispatch, InviteOutcome};
pub use payment::{PaymentInstruction, PaymentOption, PaymentToken};
pub use property::{Amenity, Property, PropertyError, PropertyLookup};
pub use quote::{NightlyRate, PricingQuote, QuoteError, QuoteService};
pub use reservation::{
    ReservationApi, ReservationConfirmation, ReservationError, ReservationRequest,
};
pub use single_flight::{FlightGuard, SingleFlight};
