//! Where "current location" comes from.

use minidash_core::LocationConfig;

use crate::types::{Location, LocationError};

#[derive(Debug, Clone, PartialEq)]
pub enum LocationSource {
    /// Coordinates the user has agreed to share
    Fixed(Location),
    /// The user declined to share a location
    Denied,
    /// No location service on this machine
    Unavailable,
}

impl LocationSource {
    pub fn from_config(config: &LocationConfig) -> Self {
        if !config.share {
            return Self::Denied;
        }
        match (config.latitude, config.longitude) {
            (Some(latitude), Some(longitude)) => Self::Fixed(Location {
                latitude,
                longitude,
            }),
            _ => Self::Unavailable,
        }
    }

    pub async fn current_location(&self) -> Result<Location, LocationError> {
        match self {
            Self::Fixed(location) => Ok(*location),
            Self::Denied => Err(LocationError::PermissionDenied),
            Self::Unavailable => Err(LocationError::ServiceUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sharing_off_is_denied() {
        let config = LocationConfig {
            share: false,
            latitude: Some(1.0),
            longitude: Some(2.0),
        };
        assert_eq!(LocationSource::from_config(&config), LocationSource::Denied);
    }

    #[tokio::test]
    async fn test_incomplete_coordinates_are_unavailable() {
        let config = LocationConfig {
            share: true,
            latitude: Some(1.0),
            longitude: None,
        };
        let source = LocationSource::from_config(&config);
        assert_eq!(source, LocationSource::Unavailable);
        assert_eq!(
            source.current_location().await.unwrap_err(),
            LocationError::ServiceUnavailable
        );
    }

    #[tokio::test]
    async fn test_fixed_location() {
        let config = LocationConfig {
            share: true,
            latitude: Some(47.6062),
            longitude: Some(-122.3321),
        };
        let location = LocationSource::from_config(&config)
            .current_location()
            .await
            .unwrap();
        assert_eq!(location.latitude, 47.6062);
        assert_eq!(location.longitude, -122.3321);
    }

    #[tokio::test]
    async fn test_denied_error() {
        let err = LocationSource::Denied.current_location().await.unwrap_err();
        assert_eq!(err, LocationError::PermissionDenied);
    }
}
