//! Angle, vector and rotation helpers.
//!
//! Euler angles are yaw (psi), pitch (theta), roll (phi) in radians, applied in that
//! order, with yaw measured clockwise from north. Direction cosine matrices rotate
//! local-level (NED) vectors into the body frame.

use nalgebra::Matrix3;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::coordinate::Vec3;

/// Default tolerance for [`are_equal`]
pub const DEFAULT_TOLERANCE: f64 = 1.0e-6;

pub fn are_equal(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

/// Wraps an angle into [0, 2π).
pub fn ang_fix_2pi(angle: f64) -> f64 {
    let mut out = angle;
    if !(0.0..TAU).contains(&out) {
        out %= TAU;
        // values within rounding distance of zero stay at zero
        if out.abs() < 1.0e-10 {
            return 0.0;
        }
        if out < 0.0 {
            out += TAU;
        }
    }
    out
}

/// Wraps an angle into [-π, π].
pub fn ang_fix_pi(angle: f64) -> f64 {
    if angle.abs() <= PI {
        return angle;
    }
    let out = ang_fix_2pi(angle);
    if out > PI {
        out - TAU
    } else {
        out
    }
}

/// Wraps into [-π, π], then clamps to [-π/2, π/2].
pub fn ang_fix_pi2(angle: f64) -> f64 {
    ang_fix_pi(angle).clamp(-FRAC_PI_2, FRAC_PI_2)
}

/// `acos` with its argument clamped to [-1, 1]
pub fn inverse_cosine(value: f64) -> f64 {
    value.clamp(-1.0, 1.0).acos()
}

/// `asin` with its argument clamped to [-1, 1]
pub fn inverse_sine(value: f64) -> f64 {
    value.clamp(-1.0, 1.0).asin()
}

/// Angle between two vectors; zero when either has zero length.
pub fn v3_angle(u: &Vec3, v: &Vec3) -> f64 {
    let lengths = u.norm() * v.norm();
    if lengths == 0.0 {
        return 0.0;
    }
    inverse_cosine(u.dot(v) / lengths)
}

/// Rotates `v` about the x axis by `angle`.
pub fn v3_rot_x(v: &Vec3, angle: f64) -> Vec3 {
    let (s, c) = angle.sin_cos();
    Vec3::new(v.x, c * v.y - s * v.z, s * v.y + c * v.z)
}

/// Rotates `v` about the y axis by `angle`.
pub fn v3_rot_y(v: &Vec3, angle: f64) -> Vec3 {
    let (s, c) = (-angle).sin_cos();
    Vec3::new(c * v.x - s * v.z, v.y, s * v.x + c * v.z)
}

/// Builds the direction cosine matrix for yaw, pitch, roll.
pub fn euler_to_dcm(ypr: &Vec3) -> Matrix3<f64> {
    let (s_psi, c_psi) = ypr.x.sin_cos();
    let (s_th, c_th) = ypr.y.sin_cos();
    let (s_phi, c_phi) = ypr.z.sin_cos();

    Matrix3::new(
        c_psi * c_th,
        s_psi * c_th,
        -s_th,
        c_psi * s_th * s_phi - s_psi * c_phi,
        s_psi * s_th * s_phi + c_psi * c_phi,
        c_th * s_phi,
        c_psi * s_th * c_phi + s_psi * s_phi,
        s_psi * s_th * c_phi - c_psi * s_phi,
        c_th * c_phi,
    )
}

/// Recovers yaw [0, 2π), pitch and roll from a direction cosine matrix.
///
/// At ±90° pitch yaw and roll are coupled; yaw is reported as zero and the whole
/// rotation is folded into roll.
pub fn dcm_to_euler(dcm: &Matrix3<f64>) -> Vec3 {
    if are_equal(dcm[(0, 2)], 1.0, DEFAULT_TOLERANCE) {
        Vec3::new(0.0, -FRAC_PI_2, (-dcm[(1, 0)]).atan2(-dcm[(2, 0)]))
    } else if are_equal(dcm[(0, 2)], -1.0, DEFAULT_TOLERANCE) {
        Vec3::new(0.0, FRAC_PI_2, dcm[(1, 0)].atan2(dcm[(2, 0)]))
    } else {
        Vec3::new(
            ang_fix_2pi(dcm[(0, 1)].atan2(dcm[(0, 0)])),
            (-dcm[(0, 2)]).asin(),
            dcm[(1, 2)].atan2(dcm[(2, 2)]),
        )
    }
}

/// Body x axis (forward) in the local NED frame.
pub fn body_unit_x(yaw: f64, pitch: f64) -> Vec3 {
    Vec3::new(yaw.cos() * pitch.cos(), yaw.sin() * pitch.cos(), -pitch.sin())
}

/// Body y axis (right wing) in the local NED frame.
pub fn body_unit_y(yaw: f64, pitch: f64, roll: f64) -> Vec3 {
    let (s_yaw, c_yaw) = yaw.sin_cos();
    let (s_pitch, c_pitch) = pitch.sin_cos();
    let (s_roll, c_roll) = roll.sin_cos();
    Vec3::new(
        s_roll * s_pitch * c_yaw - c_roll * s_yaw,
        s_roll * s_pitch * s_yaw + c_roll * c_yaw,
        s_roll * c_pitch,
    )
}

/// Body z axis (down) in the local NED frame.
pub fn body_unit_z(yaw: f64, pitch: f64, roll: f64) -> Vec3 {
    let (s_yaw, c_yaw) = yaw.sin_cos();
    let (s_pitch, c_pitch) = pitch.sin_cos();
    let (s_roll, c_roll) = roll.sin_cos();
    Vec3::new(
        c_roll * s_pitch * c_yaw + s_roll * s_yaw,
        c_roll * s_pitch * s_yaw - s_roll * c_yaw,
        c_roll * c_pitch,
    )
}

/// Inverse of [`body_unit_x`]; returns (yaw, pitch) with yaw in [-π, π].
pub fn yaw_pitch_from_body_unit_x(vec_x: &Vec3) -> (f64, f64) {
    if are_equal(vec_x.z, 1.0, DEFAULT_TOLERANCE) {
        (0.0, -FRAC_PI_2)
    } else if are_equal(vec_x.z, -1.0, DEFAULT_TOLERANCE) {
        (0.0, FRAC_PI_2)
    } else {
        (vec_x.y.atan2(vec_x.x), inverse_sine(-vec_x.z))
    }
}
