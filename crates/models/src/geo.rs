//! Longitude/latitude points and the proximity math used by the dog table's
//! `(latitude, longitude)` index.

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

const EARTH_RADIUS_KM: f64 = 6371.0088;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

/// Inclusive latitude/longitude window enclosing a search circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, ModelError> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ModelError::Validation(format!("longitude {longitude} must be within [-180, 180]")));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ModelError::Validation(format!("latitude {latitude} must be within [-90, 90]")));
        }
        Ok(Self { longitude, latitude })
    }

    /// Build from a GeoJSON-ordered `[longitude, latitude]` pair.
    pub fn from_coordinates(coords: &[f64]) -> Result<Self, ModelError> {
        match coords {
            [lng, lat] => Self::new(*lng, *lat),
            _ => Err(ModelError::Validation(format!(
                "coordinates must be [longitude, latitude], got {} values",
                coords.len()
            ))),
        }
    }

    /// Great-circle distance in kilometres.
    pub fn haversine_km(&self, other: &GeoPoint) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let dlat = lat2 - lat1;
        let dlng = (other.longitude - self.longitude).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
    }

    /// Window that contains every point within `radius_km` on the same sphere
    /// `haversine_km` measures on. Near the poles or across the antimeridian
    /// the longitude span widens to the full range.
    pub fn bounding_box(&self, radius_km: f64) -> BoundingBox {
        let angular = radius_km / EARTH_RADIUS_KM;
        let dlat = angular.to_degrees();
        let min_lat = (self.latitude - dlat).max(-90.0);
        let max_lat = (self.latitude + dlat).min(90.0);

        let cos_lat = self.latitude.to_radians().cos();
        let full = BoundingBox { min_lat, max_lat, min_lng: -180.0, max_lng: 180.0 };
        if max_lat >= 90.0 || min_lat <= -90.0 || angular.sin() >= cos_lat {
            return full;
        }
        // widest longitude offset reached by the circle
        let dlng = (angular.sin() / cos_lat).asin().to_degrees();
        let (min_lng, max_lng) = (self.longitude - dlng, self.longitude + dlng);
        if min_lng < -180.0 || max_lng > 180.0 {
            return full;
        }
        BoundingBox { min_lat, max_lat, min_lng, max_lng }
    }
}

impl BoundingBox {
    pub fn contains(&self, p: &GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&p.latitude) && (self.min_lng..=self.max_lng).contains(&p.longitude)
    }
}
