//! Weather widget for Minidash
//!
//! Looks up current conditions by city name or by coordinates from the
//! location source, and keeps the rendered result in a view model.

pub mod location;
pub mod provider;
pub mod types;
pub mod widget;

pub use location::LocationSource;
pub use provider::WeatherProvider;
pub use types::*;
pub use widget::WeatherWidget;
