//! Velocity and flight path helpers. Velocities are ENU, angles are radians.

use crate::calculations::{calculate_rel_ang, AngleRequest};
use crate::converter::ReferenceFrameConverter;
use crate::coordinate::{Coordinate, CoordinateSystem, Vec3};
use crate::error::Result;
use crate::math::{ang_fix_2pi, are_equal, DEFAULT_TOLERANCE};

// Roughly half an inch at the equator.
const SAME_POSITION_TOLERANCE: f64 = 1.0e-9;

/// ENU velocity from two geodetic fixes `dt` seconds apart, measured on a tangent plane at
/// the current fix.
pub fn velocity_from_geodetic_positions(curr_lla: &Vec3, prev_lla: &Vec3, dt: f64) -> Result<Vec3> {
    let same_position = curr_lla
        .iter()
        .zip(prev_lla.iter())
        .all(|(c, p)| are_equal(*c, *p, SAME_POSITION_TOLERANCE));
    if are_equal(dt, 0.0, DEFAULT_TOLERANCE) || same_position {
        return Ok(Vec3::zeros());
    }

    let converter = ReferenceFrameConverter::with_origin(curr_lla);
    let to_x_east = |lla: &Vec3| -> Result<Vec3> {
        Ok(converter
            .convert(&Coordinate::new(CoordinateSystem::Lla, *lla), CoordinateSystem::XEast)?
            .position)
    };
    Ok((to_x_east(curr_lla)? - to_x_east(prev_lla)?) / dt)
}

/// Heading [0, 2π) and pitch of an ENU velocity, with zero roll.
pub fn flight_path_angles(enu_vel: &Vec3) -> Vec3 {
    if enu_vel.iter().all(|v| are_equal(*v, 0.0, DEFAULT_TOLERANCE)) {
        return Vec3::zeros();
    }
    Vec3::new(
        ang_fix_2pi(enu_vel.x.atan2(enu_vel.y)),
        enu_vel.z.atan2(enu_vel.x.hypot(enu_vel.y)),
        0.0,
    )
}

/// ENU velocity from speed and flight path heading and pitch.
pub fn velocity_from_flight_path(speed: f64, heading: f64, pitch: f64) -> Vec3 {
    let (s_heading, c_heading) = heading.sin_cos();
    let (s_pitch, c_pitch) = pitch.sin_cos();
    Vec3::new(
        speed * s_heading * c_pitch,
        speed * c_heading * c_pitch,
        speed * s_pitch,
    )
}

/// Angle of attack, sideslip and total angle of attack of a body at `ypr` moving with
/// `enu_vel`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AeroAngles {
    pub angle_of_attack: f64,
    pub sideslip: f64,
    pub total_angle_of_attack: f64,
}

/// Computes [`AeroAngles`]. Without `use_roll` the body roll is ignored, which keeps alpha
/// and beta from oscillating on a spinning airframe.
pub fn aoa_sideslip_total_aoa(enu_vel: &Vec3, ypr: &Vec3, use_roll: bool) -> Result<AeroAngles> {
    let mut reference = *ypr;
    if !use_roll {
        reference.z = 0.0;
    }

    let angles = calculate_rel_ang(enu_vel, &reference, AngleRequest::ALL)?;
    // measured from the velocity vector back to the body, so the signs flip
    Ok(AeroAngles {
        angle_of_attack: -angles.elevation.unwrap_or_default(),
        sideslip: -angles.azimuth.unwrap_or_default(),
        total_angle_of_attack: angles.composite.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ang_fix_pi;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn velocity_between_fixes() {
        let prev = Vec3::new(0.5f64.to_radians(), 10f64.to_radians(), 1000.0);
        let mut curr = prev;
        curr.x += 100.0 / 6_378_137.0;
        curr.z += 50.0;

        let vel = velocity_from_geodetic_positions(&curr, &prev, 10.0).unwrap();
        assert_abs_diff_eq!(vel.x, 0.0, epsilon = 1e-2);
        assert_abs_diff_eq!(vel.y, 10.0, epsilon = 0.1);
        assert_abs_diff_eq!(vel.z, 5.0, epsilon = 1e-2);

        let fpa = flight_path_angles(&vel);
        assert_abs_diff_eq!(ang_fix_pi(fpa.x), 0.0, epsilon = 1e-3);
        assert!(fpa.y > 0.0);
        assert_eq!(fpa.z, 0.0);
    }

    #[test]
    fn stationary_or_instant_gives_zero() {
        let p = Vec3::new(0.1, 0.2, 30.0);
        assert_eq!(velocity_from_geodetic_positions(&p, &p, 1.0).unwrap(), Vec3::zeros());
        let q = Vec3::new(0.1, 0.2001, 30.0);
        assert_eq!(velocity_from_geodetic_positions(&q, &p, 0.0).unwrap(), Vec3::zeros());
        assert_eq!(flight_path_angles(&Vec3::zeros()), Vec3::zeros());
    }

    #[test]
    fn flight_path_round_trip() {
        let heading = 230f64.to_radians();
        let pitch = -12f64.to_radians();
        let vel = velocity_from_flight_path(250.0, heading, pitch);
        assert_relative_eq!(vel.norm(), 250.0, epsilon = 1e-9);
        let fpa = flight_path_angles(&vel);
        assert_relative_eq!(fpa.x, heading, epsilon = 1e-12);
        assert_relative_eq!(fpa.y, pitch, epsilon = 1e-12);
    }

    #[test]
    fn aerodynamic_angles() {
        // yaw, pitch, roll (rad), ENU velocity, expected aoa, sideslip, total aoa (rad)
        let rows = [
            ([1.5708, 1.10174, 0.0], [821.82, 0.0, 2361.06], [-0.134094, 0.0, 0.134094]),
            ([1.5708, 1.11942, 0.0], [1586.49, 0.0, 3415.72], [-0.0165457, 0.0, 0.0165457]),
            ([0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
            ([0.0, 0.0, 0.0], [16644.39016, 29208.15583, -28846.88083], [0.709169, -0.517958, 0.85083]),
            ([3.14159, 3.14159, 3.14159], [1.0, 1.0, -1.0], [0.615483, -0.785401, 0.95532]),
            ([1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [0.744443, -1.64536, 1.625611]),
            ([10.84689, -9.9035, -0.86838], [0.0, 1.0, 0.0], [0.7906, -1.38277, 1.43893]),
        ];
        let tolerance = 0.01f64.to_radians();
        for (ypr, vel, expected) in rows {
            let angles = aoa_sideslip_total_aoa(&Vec3::from(vel), &Vec3::from(ypr), true).unwrap();
            assert!(ang_fix_pi(angles.angle_of_attack - expected[0]).abs() < tolerance);
            assert!(ang_fix_pi(angles.sideslip - expected[1]).abs() < tolerance);
            assert!(ang_fix_pi(angles.total_angle_of_attack - expected[2]).abs() < tolerance);
        }
    }

    #[test]
    fn roll_only_matters_with_use_roll() {
        let vel = Vec3::new(100.0, 1000.0, 50.0);
        let rolled = Vec3::new(0.0, 0.0, 1.0);
        let without = aoa_sideslip_total_aoa(&vel, &rolled, false).unwrap();
        let level = aoa_sideslip_total_aoa(&vel, &Vec3::zeros(), true).unwrap();
        assert_eq!(without, level);
        let with = aoa_sideslip_total_aoa(&vel, &rolled, true).unwrap();
        assert_relative_eq!(with.total_angle_of_attack, level.total_angle_of_attack, epsilon = 1e-12);
        assert!((with.sideslip - level.sideslip).abs() > 1e-3);
    }
}
