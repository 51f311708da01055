use serde::Deserialize;

use crate::coordinate::{Coordinate, CoordinateSystem, Vec3};

/// A named entity as written in a scenario file: degrees for angles, meters and m/s for
/// everything else.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Platform {
    pub name: String,
    pub latitude: f64,  // degrees
    pub longitude: f64, // degrees
    pub altitude: f64,  // meters
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub roll: f64,
    /// East, north, up in m/s
    #[serde(default)]
    pub velocity: [f64; 3],
}

impl Platform {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64, alt: f64) -> Self {
        Self {
            name: name.into(),
            latitude: lat,
            longitude: lon,
            altitude: alt,
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            velocity: [0.0; 3],
        }
    }

    /// Geodetic position in radians and meters
    pub fn lla(&self) -> Vec3 {
        Vec3::new(self.latitude.to_radians(), self.longitude.to_radians(), self.altitude)
    }

    /// Yaw, pitch, roll in radians
    pub fn orientation(&self) -> Vec3 {
        Vec3::new(self.yaw.to_radians(), self.pitch.to_radians(), self.roll.to_radians())
    }

    pub fn velocity(&self) -> Vec3 {
        Vec3::from(self.velocity)
    }

    /// Full geodetic state, ready for a converter.
    pub fn to_coordinate(&self) -> Coordinate {
        Coordinate::new(CoordinateSystem::Lla, self.lla())
            .with_orientation(self.orientation())
            .with_velocity(self.velocity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn degrees_become_radians() {
        let mut platform = Platform::new("chase", 45.0, -90.0, 1200.0);
        platform.yaw = 180.0;
        platform.velocity = [10.0, 0.0, -1.0];

        let coord = platform.to_coordinate();
        assert_eq!(coord.system, CoordinateSystem::Lla);
        assert_relative_eq!(coord.lat(), std::f64::consts::FRAC_PI_4);
        assert_relative_eq!(coord.lon(), -std::f64::consts::FRAC_PI_2);
        assert_eq!(coord.alt(), 1200.0);
        assert_relative_eq!(coord.orientation.unwrap().x, std::f64::consts::PI);
        assert_eq!(coord.velocity.unwrap(), Vec3::new(10.0, 0.0, -1.0));
    }
}
