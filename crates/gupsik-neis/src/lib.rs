//! NEIS open API integration for Gupsik.
//!
//! Builds meal and school-search request URLs and normalizes the service's
//! JSON envelopes into a uniform [`Outcome`].

pub mod client;
pub mod error;
pub mod normalize;
pub mod query;
pub mod types;

pub use client::NeisClient;
pub use error::{NeisError, NO_DATA_MESSAGE, TRANSPORT_ERROR_MESSAGE};
pub use gupsik_core::{LocaleIdentity, MealSlot};
pub use normalize::{
    normalize_meal_response, normalize_school_search_response, try_normalize_meal_response,
    try_normalize_school_search_response,
};
pub use query::{Clock, FixedClock, QueryBuilder, SystemClock};
pub use types::{MealDate, MealRecord, Outcome, SchoolRecord};
