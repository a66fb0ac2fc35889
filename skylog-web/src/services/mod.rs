//! Outbound lookups and input validation
//!
//! - **Geocoder** (`geocoder`): location text to coordinates, with fallback
//! - **Weather** (`weather`): Open-Meteo forecast and archive client
//! - **Validators** (`validators`): date range checks for the forms

pub mod geocoder;
pub mod validators;
pub mod weather;

pub use geocoder::{GeocodeError, GeocodeSource, Geocoder, ProviderError, ResolvedLocation};
pub use validators::{validate_date_range, DateRange, DateRangeError};
pub use weather::{WeatherClient, WeatherError};
