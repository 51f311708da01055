use crate::calculations::{absolute_az_el, geodetic_end_point, slant_distance, AngleRequest, EarthModel};
use crate::coordinate::Vec3;
use crate::error::Result;
use crate::math::ang_fix_pi;

/// Angular and range volume around a host: true azimuth and elevation of the centre with
/// full width and height, all in radians, between two slant ranges in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gate {
    pub azimuth: f64,
    pub elevation: f64,
    pub width: f64,
    pub height: f64,
    pub min_range: f64,
    pub max_range: f64,
}

/// Laser pointing from its host along a true azimuth and elevation out to `range` meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Laser {
    pub azimuth: f64,
    pub elevation: f64,
    pub range: f64,
}

impl Gate {
    /// True when `point_lla` is strictly inside the gate hosted at `host_lla`; a point on
    /// any boundary is outside.
    pub fn contains(&self, host_lla: &Vec3, point_lla: &Vec3, model: EarthModel<'_>) -> Result<bool> {
        let angles = absolute_az_el(host_lla, point_lla, AngleRequest::AZIMUTH_ELEVATION, model)?;
        let range = slant_distance(host_lla, point_lla, model)?;
        let azimuth = angles.azimuth.unwrap_or_default();
        let elevation = angles.elevation.unwrap_or_default();

        let half_width = self.width / 2.0;
        let half_height = self.height / 2.0;
        // offsets wrap so a gate may straddle north
        Ok(self.min_range < range
            && range < self.max_range
            && ang_fix_pi(azimuth - self.azimuth).abs() < half_width
            && ang_fix_pi(elevation - self.elevation).abs() < half_height)
    }

    /// True when the laser host and `num_points` samples spaced evenly along the beam,
    /// starting at the host, are all inside the gate.
    pub fn contains_laser(
        &self,
        host_lla: &Vec3,
        laser_host_lla: &Vec3,
        laser: &Laser,
        model: EarthModel<'_>,
        num_points: usize,
    ) -> Result<bool> {
        if !self.contains(host_lla, laser_host_lla, model)? {
            return Ok(false);
        }

        let step = laser.range / num_points as f64;
        for i in 0..num_points {
            let sample = geodetic_end_point(laser_host_lla, laser.azimuth, laser.elevation, i as f64 * step);
            if !self.contains(host_lla, &sample, model)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::ReferenceFrameConverter;

    fn deg(lat: f64, lon: f64, alt: f64) -> Vec3 {
        Vec3::new(lat.to_radians(), lon.to_radians(), alt)
    }

    // due east of the host, slightly above the horizon
    fn east_gate() -> Gate {
        Gate {
            azimuth: 90f64.to_radians(),
            elevation: 0.0,
            width: 10f64.to_radians(),
            height: 10f64.to_radians(),
            min_range: 1_000.0,
            max_range: 50_000.0,
        }
    }

    #[test]
    fn point_inside_and_outside() {
        let host = deg(30.0, -80.0, 0.0);
        let gate = east_gate();
        assert!(gate.contains(&host, &deg(30.0, -79.9, 500.0), EarthModel::Wgs84).unwrap());
        // north of the host
        assert!(!gate.contains(&host, &deg(30.1, -80.0, 500.0), EarthModel::Wgs84).unwrap());
        // too close
        assert!(!gate.contains(&host, &deg(30.0, -79.999, 0.0), EarthModel::Wgs84).unwrap());
        // too far
        assert!(!gate.contains(&host, &deg(30.0, -79.0, 0.0), EarthModel::Wgs84).unwrap());
    }

    #[test]
    fn boundary_is_outside() {
        let host = deg(30.0, -80.0, 0.0);
        let point = deg(30.0, -79.9, 500.0);
        let range = slant_distance(&host, &point, EarthModel::Wgs84).unwrap();
        let azimuth = absolute_az_el(&host, &point, AngleRequest::AZIMUTH, EarthModel::Wgs84)
            .unwrap()
            .azimuth
            .unwrap();

        let on_min_range = Gate {
            min_range: range,
            ..east_gate()
        };
        assert!(!on_min_range.contains(&host, &point, EarthModel::Wgs84).unwrap());

        let zero_width = Gate {
            azimuth,
            width: 0.0,
            ..east_gate()
        };
        assert!(!zero_width.contains(&host, &point, EarthModel::Wgs84).unwrap());
    }

    #[test]
    fn angular_edges_at_nonzero_width() {
        let host = deg(30.0, -80.0, 0.0);
        let point = deg(30.0, -79.9, 500.0);
        let azimuth = absolute_az_el(&host, &point, AngleRequest::AZIMUTH, EarthModel::Wgs84)
            .unwrap()
            .azimuth
            .unwrap();
        let half_width = east_gate().width / 2.0;

        let just_inside = Gate {
            azimuth: azimuth + half_width - 1e-9,
            ..east_gate()
        };
        assert!(just_inside.contains(&host, &point, EarthModel::Wgs84).unwrap());

        let just_outside = Gate {
            azimuth: azimuth + half_width + 1e-9,
            ..east_gate()
        };
        assert!(!just_outside.contains(&host, &point, EarthModel::Wgs84).unwrap());

        let other_side = Gate {
            azimuth: azimuth - half_width - 1e-9,
            ..east_gate()
        };
        assert!(!other_side.contains(&host, &point, EarthModel::Wgs84).unwrap());
    }

    #[test]
    fn gate_straddling_north() {
        let host = deg(30.0, -80.0, 0.0);
        let north_gate = Gate {
            azimuth: 0.0,
            width: 20f64.to_radians(),
            ..east_gate()
        };
        // just west of north, bearing about 357.5 degrees
        let west_of_north = deg(30.1, -80.005, 0.0);
        // just east of north, bearing about 2.5 degrees
        let east_of_north = deg(30.1, -79.995, 0.0);
        assert!(north_gate.contains(&host, &west_of_north, EarthModel::Wgs84).unwrap());
        assert!(north_gate.contains(&host, &east_of_north, EarthModel::Wgs84).unwrap());

        let west_gate = Gate {
            azimuth: 355f64.to_radians(),
            ..north_gate
        };
        assert!(west_gate.contains(&host, &east_of_north, EarthModel::Wgs84).unwrap());
        assert!(!west_gate.contains(&host, &deg(30.1, -79.98, 0.0), EarthModel::Wgs84).unwrap());
    }

    #[test]
    fn flat_earth_gate() {
        let converter = ReferenceFrameConverter::with_origin(&deg(30.0, -80.0, 0.0));
        let model = EarthModel::flat_earth(&converter).unwrap();
        let gate = east_gate();
        assert!(gate.contains(&deg(30.0, -80.0, 0.0), &deg(30.0, -79.9, 500.0), model).unwrap());
    }

    #[test]
    fn laser_samples() {
        let host = deg(30.0, -80.0, 0.0);
        let laser_host = deg(30.0, -79.95, 200.0);
        let gate = east_gate();

        let along = Laser {
            azimuth: 90f64.to_radians(),
            elevation: 0.0,
            range: 10_000.0,
        };
        assert!(gate.contains_laser(&host, &laser_host, &along, EarthModel::Wgs84, 10).unwrap());

        let outward = Laser {
            range: 100_000.0,
            ..along
        };
        assert!(!gate.contains_laser(&host, &laser_host, &outward, EarthModel::Wgs84, 10).unwrap());

        let north = Laser {
            azimuth: 0.0,
            ..along
        };
        assert!(!gate.contains_laser(&host, &laser_host, &north, EarthModel::Wgs84, 10).unwrap());

        // host outside the gate
        let behind = deg(30.0, -80.05, 0.0);
        assert!(!gate.contains_laser(&host, &behind, &along, EarthModel::Wgs84, 10).unwrap());
    }
}
