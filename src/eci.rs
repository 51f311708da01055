use chrono::{DateTime, Utc};
use nalgebra::Matrix3;

use crate::constants::EARTH_ROTATION_RATE;
use crate::coordinate::{Coordinate, CoordinateSystem, Vec3};
use crate::error::{ConversionError, Result};
use crate::math::{ang_fix_2pi, dcm_to_euler, euler_to_dcm};

/// Instant at which the ECI and ECEF frames coincide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EciEpoch {
    pub epoch: DateTime<Utc>,
}

impl EciEpoch {
    pub fn new(epoch: DateTime<Utc>) -> Self {
        Self { epoch }
    }

    /// Seconds from the epoch to `time`, the value a [`Coordinate`] carries as its
    /// elapsed ECI time.
    pub fn elapsed_seconds(&self, time: DateTime<Utc>) -> f64 {
        let duration = time.signed_duration_since(self.epoch);
        duration.num_milliseconds() as f64 / 1000.0
    }

    /// Earth rotation angle accumulated since the epoch, in [0, 2π)
    pub fn rotation_angle(&self, time: DateTime<Utc>) -> f64 {
        ang_fix_2pi(EARTH_ROTATION_RATE * self.elapsed_seconds(time))
    }
}

/// ECEF to ECI at the coordinate's elapsed ECI time.
pub fn ecef_to_eci(ecef: &Coordinate) -> Result<Coordinate> {
    if ecef.system != CoordinateSystem::Ecef {
        return Err(ConversionError::InvalidSystem {
            expected: "ECEF",
            found: ecef.system,
        });
    }
    rotate_about_z(ecef, CoordinateSystem::Eci, EARTH_ROTATION_RATE)
}

/// ECI to ECEF at the coordinate's elapsed ECI time.
pub fn eci_to_ecef(eci: &Coordinate) -> Result<Coordinate> {
    if eci.system != CoordinateSystem::Eci {
        return Err(ConversionError::InvalidSystem {
            expected: "ECI",
            found: eci.system,
        });
    }
    rotate_about_z(eci, CoordinateSystem::Ecef, -EARTH_ROTATION_RATE)
}

// Rotation about the polar axis by rate * elapsed time. Velocity picks up the transport
// term of the rotating frame, acceleration the Coriolis and centripetal terms; the
// acceleration is only carried when a velocity is present.
fn rotate_about_z(input: &Coordinate, system: CoordinateSystem, rate: f64) -> Result<Coordinate> {
    let elapsed = input.elapsed_eci_time;
    if !elapsed.is_finite() {
        return Err(ConversionError::NonFiniteEciTime(elapsed));
    }

    let angle = ang_fix_2pi(rate * elapsed);
    let (sin_w, cos_w) = angle.sin_cos();
    let rotate = |x: f64, y: f64, z: f64| {
        Vec3::new(x * cos_w - y * sin_w, y * cos_w + x * sin_w, z)
    };

    let pos = &input.position;
    let mut out = input.blank_as(system);
    out.position = rotate(pos.x, pos.y, pos.z);

    out.orientation = input.orientation.map(|ori| {
        let z_rot = Matrix3::new(cos_w, sin_w, 0.0, -sin_w, cos_w, 0.0, 0.0, 0.0, 1.0);
        dcm_to_euler(&(euler_to_dcm(&ori) * z_rot))
    });

    if let Some(vel) = input.velocity {
        let x_vel = vel.x - rate * pos.y;
        let y_vel = vel.y + rate * pos.x;
        out.velocity = Some(rotate(x_vel, y_vel, vel.z));

        if let Some(acc) = input.acceleration {
            let rate2 = rate * rate.abs();
            let x_acc = acc.x - 2.0 * rate * vel.y - rate2 * pos.x;
            let y_acc = acc.y + 2.0 * rate * vel.x - rate2 * pos.y;
            out.acceleration = Some(rotate(x_acc, y_acc, acc.z));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WGS_A;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    #[test]
    fn elapsed_time_from_epoch() {
        let epoch = EciEpoch::new(Utc.with_ymd_and_hms(2024, 3, 20, 0, 0, 0).unwrap());
        let later = epoch.epoch + Duration::milliseconds(90_500);
        assert_relative_eq!(epoch.elapsed_seconds(later), 90.5);

        let sidereal_day = std::f64::consts::TAU / EARTH_ROTATION_RATE;
        let one_day = epoch.epoch + Duration::milliseconds((sidereal_day * 1000.0) as i64);
        let angle = epoch.rotation_angle(one_day);
        assert!(angle < 1e-6 || angle > std::f64::consts::TAU - 1e-6);
    }

    #[test]
    fn frames_coincide_at_epoch() {
        let ecef = Coordinate::new(CoordinateSystem::Ecef, Vec3::new(WGS_A, 0.0, 0.0));
        let eci = ecef_to_eci(&ecef).unwrap();
        assert_eq!(eci.system, CoordinateSystem::Eci);
        assert_relative_eq!(eci.position, ecef.position);
    }

    #[test]
    fn quarter_turn() {
        let t = std::f64::consts::FRAC_PI_2 / EARTH_ROTATION_RATE;
        let ecef = Coordinate::new(CoordinateSystem::Ecef, Vec3::new(WGS_A, 0.0, 0.0))
            .with_elapsed_eci_time(t);
        let eci = ecef_to_eci(&ecef).unwrap();
        assert_relative_eq!(eci.position, Vec3::new(0.0, WGS_A, 0.0), epsilon = 1e-6);
        assert_eq!(eci.elapsed_eci_time, t);
    }

    #[test]
    fn fixed_point_moves_in_inertial_frame() {
        // a point at rest on the equator moves east at omega * a
        let ecef = Coordinate::new(CoordinateSystem::Ecef, Vec3::new(WGS_A, 0.0, 0.0))
            .with_velocity(Vec3::zeros())
            .with_acceleration(Vec3::zeros());
        let eci = ecef_to_eci(&ecef).unwrap();
        assert_relative_eq!(eci.velocity.unwrap().y, EARTH_ROTATION_RATE * WGS_A, epsilon = 1e-9);
        // centripetal acceleration points at the axis
        assert_relative_eq!(
            eci.acceleration.unwrap().x,
            -EARTH_ROTATION_RATE * EARTH_ROTATION_RATE * WGS_A,
            epsilon = 1e-9
        );
    }

    #[test]
    fn round_trip_with_full_state() {
        let ecef = Coordinate::new(CoordinateSystem::Ecef, Vec3::new(1.0e6, -5.0e6, 3.0e6))
            .with_orientation(Vec3::new(0.4, 0.1, 0.2))
            .with_velocity(Vec3::new(100.0, 50.0, -10.0))
            .with_elapsed_eci_time(1234.5);
        let back = eci_to_ecef(&ecef_to_eci(&ecef).unwrap()).unwrap();
        assert_relative_eq!(back.position, ecef.position, epsilon = 1e-6);
        assert_relative_eq!(back.velocity.unwrap(), ecef.velocity.unwrap(), epsilon = 1e-6);
        assert_relative_eq!(back.orientation.unwrap(), ecef.orientation.unwrap(), epsilon = 1e-9);
    }

    #[test]
    fn non_finite_time_is_rejected() {
        let ecef = Coordinate::new(CoordinateSystem::Ecef, Vec3::new(WGS_A, 0.0, 0.0))
            .with_elapsed_eci_time(f64::NAN);
        assert!(matches!(
            ecef_to_eci(&ecef),
            Err(ConversionError::NonFiniteEciTime(_))
        ));
    }
}
