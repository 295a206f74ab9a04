use async_trait::async_trait;

use crate::core::error::{AppError, Result};
use crate::shared::types::Coordinates;

/// Source of the device's current position
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn locate(&self) -> Result<Coordinates>;
}

/// A position known up front, e.g. passed on the command line
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl Geolocator for FixedLocation {
    async fn locate(&self) -> Result<Coordinates> {
        Ok(self.0)
    }
}

/// Device without location support or where the user denied access
pub struct NoLocation;

#[async_trait]
impl Geolocator for NoLocation {
    async fn locate(&self) -> Result<Coordinates> {
        Err(AppError::NotFound(
            "Geolocation is not available on this device".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok, block_on};

    #[test]
    fn test_fixed_location() {
        let coords = assert_ok!(block_on(FixedLocation(Coordinates::new(1.5, -2.5)).locate()));
        assert_eq!(coords, Coordinates::new(1.5, -2.5));
    }

    #[test]
    fn test_no_location() {
        assert_err!(block_on(NoLocation.locate()));
    }
}
