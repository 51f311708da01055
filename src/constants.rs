//! Earth model constants shared by the converter and the calculation layer.

/// WGS-84 semi-major axis (meters)
pub const WGS_A: f64 = 6378137.0;
/// WGS-84 flattening
pub const WGS_F: f64 = 1.0 / 298.257223563;
/// WGS-84 semi-minor axis (meters)
pub const WGS_B: f64 = WGS_A * (1.0 - WGS_F);
/// First eccentricity squared
pub const WGS_ESQ: f64 = WGS_F * (2.0 - WGS_F);
/// Second eccentricity squared
pub const WGS_EP2: f64 = WGS_ESQ / (1.0 - WGS_ESQ);
/// Complement of eccentricity squared
pub const WGS_ESQC: f64 = 1.0 - WGS_ESQ;
pub const WGS_A2: f64 = WGS_A * WGS_A;
pub const WGS_B2: f64 = WGS_B * WGS_B;

/// Mean earth radius used by the perfect-sphere model (meters)
pub const EARTH_RADIUS: f64 = 6371000.0;

/// Sidereal rotation rate of the earth (rad/s)
pub const EARTH_ROTATION_RATE: f64 = 7.292115146706979e-5;

/// Tolerance below which two latitudes or longitudes (radians) are the same place
pub const LATLON_ERR_TOL: f64 = 1.0e-10;

/// Effective earth radius scalar for the optical horizon
pub const DEFAULT_OPTICAL_RADIUS: f64 = 1.06;
/// Effective earth radius scalar for the radar horizon
pub const DEFAULT_RF_RADIUS: f64 = 4.0 / 3.0;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn derived_ellipsoid_values() {
        assert_relative_eq!(WGS_B, 6356752.314245179, epsilon = 1e-6);
        assert_relative_eq!(WGS_ESQ, 0.0066943799901413165, epsilon = 1e-15);
        assert_relative_eq!(WGS_EP2, 0.006739496742276434, epsilon = 1e-15);
    }
}
