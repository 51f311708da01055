//! Down-range / cross-range of a target along a geodesic heading.
//!
//! The foot point is found by walking along the reference heading until the geodesic to the
//! target leaves it at a right angle. A coarse bisection brackets the foot point and a secant
//! search finishes it.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::constants::LATLON_ERR_TOL;
use crate::coordinate::Vec3;
use crate::geodesics::{sodano_direct, sodano_inverse};
use crate::math::{ang_fix_2pi, ang_fix_pi, are_equal};
use crate::search::{BisectionSearch, LinearSearch, NumericalSearchType};

/// Default down-range below which the target is treated as the reference point
pub const DEFAULT_MIN_DOWN_RANGE: f64 = 0.0005;
/// Default cross-range below which no search is run
pub const DEFAULT_MIN_CROSS_RANGE: f64 = 0.0005;

const BISECTION_MAX_ITER: u32 = 25;
const BISECTION_TOLERANCE: f64 = 0.33;
const LINEAR_MAX_ITER: u32 = 50;
const LINEAR_TOLERANCE: f64 = 1.0e-6;
const LINEAR_STEP: f64 = 1.0e-7;
/// Failures with either range beyond this are far points with no useful answer
const FAR_POINT_RANGE: f64 = 1.0e7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodesicDrcr {
    /// Meters along the heading; negative behind the reference point
    pub down_range: f64,
    /// Meters off the heading; positive to the right
    pub cross_range: f64,
    pub status: NumericalSearchType,
}

impl GeodesicDrcr {
    fn converged(down_range: f64) -> Self {
        Self {
            down_range,
            cross_range: 0.0,
            status: NumericalSearchType::Converged,
        }
    }
}

/// How the outcome of a search is surfaced in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureReport {
    Silent,
    FarPoint,
    Logged,
}

fn failure_report(
    status: NumericalSearchType,
    down_range: f64,
    cross_range: f64,
    right_triangle: bool,
) -> FailureReport {
    match status {
        NumericalSearchType::Failed if down_range.abs().max(cross_range.abs()) > FAR_POINT_RANGE => {
            FailureReport::FarPoint
        }
        NumericalSearchType::Failed if right_triangle => FailureReport::Logged,
        NumericalSearchType::MaxIter => FailureReport::Logged,
        _ => FailureReport::Silent,
    }
}

fn same_lat_lon(a: &Vec3, b: &Vec3) -> bool {
    (a.y - b.y).abs() <= LATLON_ERR_TOL && (a.x - b.x).abs() <= LATLON_ERR_TOL
}

/// Resolves `to_lla` into down-range and cross-range along `yaw` from `from_lla`.
///
/// The ranges are a best effort whatever the status; callers decide what to do with a
/// `Failed` or `MaxIter` result.
pub fn calculate_geodesic_drcr(
    from_lla: &Vec3,
    yaw: f64,
    to_lla: &Vec3,
    min_dr: f64,
    min_cr: f64,
) -> GeodesicDrcr {
    let (lat_ref, lon_ref, alt_ref) = (from_lla.x, from_lla.y, from_lla.z);
    let (lat, lon) = (to_lla.x, to_lla.y);
    let coincident = same_lat_lon(from_lla, to_lla);

    let mut dwnrng = 0.0;
    let mut azf = 0.0;
    if !coincident {
        let inv = sodano_inverse(lat_ref, lon_ref, alt_ref, lat, lon, true, false);
        dwnrng = inv.distance;
        azf = inv.forward_azimuth.unwrap_or(0.0);
    }

    if dwnrng < min_dr {
        return GeodesicDrcr::converged(0.0);
    }

    // angle between the heading and the bearing to the target, folded into [0, π]
    let a1 = ang_fix_2pi(yaw);
    let a2 = ang_fix_2pi(azf);
    let a2ma1 = (a2 - a1).abs();
    let da = a2ma1.min((a2ma1 - TAU).abs());
    let behind = da > FRAC_PI_2;

    if dwnrng * da.sin() < min_cr {
        return GeodesicDrcr::converged(if behind { -dwnrng } else { dwnrng });
    }

    let (mut dwnlo, mut dwnhi) = if behind {
        (-1.20 * dwnrng, -min_dr)
    } else {
        (min_dr, 1.20 * dwnrng)
    };

    let mut delaz = 0.0;
    let mut crsrng = 0.0;
    let mut err = 2.0e30;
    let mut bisect = BisectionSearch::new(BISECTION_MAX_ITER, BISECTION_TOLERANCE);
    let mut linear = LinearSearch::new(LINEAR_MAX_ITER, LINEAR_TOLERANCE);
    let mut status = NumericalSearchType::Init;

    for fine in [false, true] {
        // the fine search starts even if the coarse one did not converge
        status = NumericalSearchType::Init;
        loop {
            status = if fine {
                linear.search_x(&mut dwnrng, err, dwnlo, dwnhi, LINEAR_STEP, status)
            } else {
                bisect.search_x(&mut dwnrng, err, &mut dwnlo, &mut dwnhi, status)
            };
            if !status.is_searching() {
                break;
            }

            // foot point at dwnrng along the heading, and the azimuth from it back to the reference
            let (lat2, lon2, azbk) = if dwnrng > 0.01 * min_dr {
                let d = sodano_direct(lat_ref, lon_ref, alt_ref, dwnrng, yaw);
                (d.lat, d.lon, d.back_azimuth)
            } else if dwnrng < -0.01 * min_dr {
                let d = sodano_direct(lat_ref, lon_ref, alt_ref, -dwnrng, yaw + PI);
                (d.lat, d.lon, d.back_azimuth)
            } else {
                (lat_ref, lon_ref, if dwnrng < 0.0 { yaw } else { -yaw })
            };

            azf = 0.0;
            crsrng = 0.0;
            if !coincident {
                let inv = sodano_inverse(lat2, lon2, alt_ref, lat, lon, true, false);
                crsrng = inv.distance;
                azf = inv.forward_azimuth.unwrap_or(0.0);
            }

            delaz = ang_fix_pi(azf - azbk);
            err = FRAC_PI_2 - delaz.abs();
        }
    }

    if status != NumericalSearchType::NoRoot {
        if delaz > 0.0 {
            crsrng = -crsrng;
        }
        if dwnrng < 0.0 {
            crsrng = -crsrng;
        }
    }

    // Reference, foot point and target should form a right angle at the foot point. Near a
    // pole the inverse azimuths can cut across it and the remaining angles no longer sum to 90.
    let angle_ref = a2 - a1;
    let angle_target = (azf - PI) - a2;
    let angle_sum = ang_fix_pi(angle_ref + angle_target);
    let right_triangle =
        are_equal(angle_sum, FRAC_PI_2, 0.04) || are_equal(angle_sum, -FRAC_PI_2, 0.04);

    match failure_report(status, dwnrng, crsrng, right_triangle) {
        FailureReport::FarPoint => {
            tracing::debug!(
                max_range = dwnrng.abs().max(crsrng.abs()),
                "geodesic DR/CR failed on a far point"
            );
        }
        FailureReport::Logged => {
            tracing::error!(
                from_lat = lat_ref,
                from_lon = lon_ref,
                from_alt = alt_ref,
                yaw,
                to_lat = lat,
                to_lon = lon,
                status = ?status,
                "geodesic DR/CR linear search did not converge"
            );
        }
        FailureReport::Silent => {}
    }

    GeodesicDrcr {
        down_range: dwnrng,
        cross_range: crsrng,
        status,
    }
}
