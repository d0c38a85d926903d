//! Place name to coordinate resolution.

pub mod provider;
pub mod resolver;

pub use provider::{GeocodingProvider, LookupError, NominatimProvider};
pub use resolver::{GeocodeResolver, RetryPolicy};
