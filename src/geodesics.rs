//! Sodano's direct and inverse geodesic solutions on the WGS-84 ellipsoid.
//!
//! E. M. Sodano and T. A. Robinson, "Direct and Inverse Solutions in Geodesics",
//! Technical Report 7, U.S. Army Map Service, 1963, pp. 15-27.
//!
//! The ellipsoid is inflated by the reference altitude, so distances are measured on a
//! surface through the reference point. Angles are radians, distances meters.

use crate::constants::{WGS_A, WGS_F};
use crate::coordinate::Vec3;
use crate::math::{ang_fix_pi, ang_fix_pi2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectSolution {
    pub lat: f64,
    pub lon: f64,
    /// Azimuth from the destination back toward the reference point
    pub back_azimuth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseSolution {
    pub distance: f64,
    pub forward_azimuth: Option<f64>,
    pub back_azimuth: Option<f64>,
}

/// Ellipsoid terms shared by both solutions
struct Ellipsoid {
    reqtr: f64,
    rpolr: f64,
    flat: f64,
}

impl Ellipsoid {
    fn at_altitude(alt: f64) -> Self {
        let reqtr = WGS_A + alt;
        let rpolr = reqtr * (1.0 - WGS_F);
        Self {
            reqtr,
            rpolr,
            flat: 1.0 - rpolr / reqtr,
        }
    }

    /// Reduced latitude
    fn beta(&self, lat: f64) -> f64 {
        (self.rpolr * lat.sin()).atan2(self.reqtr * lat.cos())
    }
}

/// Point at `distance` along `forward_azimuth` from the reference point.
pub fn sodano_direct(
    ref_lat: f64,
    ref_lon: f64,
    ref_alt: f64,
    distance: f64,
    forward_azimuth: f64,
) -> DirectSolution {
    let e = Ellipsoid::at_altitude(ref_alt);
    let ecc2 = (e.reqtr * e.reqtr - e.rpolr * e.rpolr) / (e.rpolr * e.rpolr);
    let flat = e.flat;

    let theta = distance / e.rpolr;
    let beta1 = e.beta(ref_lat);
    let (sbeta1, cbeta1) = beta1.sin_cos();
    let (stheta, ctheta) = theta.sin_cos();
    let (saz, caz) = forward_azimuth.sin_cos();

    let g = cbeta1 * caz;
    let h = cbeta1 * saz;
    let m = (1.0 + 0.5 * ecc2 * sbeta1 * sbeta1) * (1.0 - h * h) * 0.5;
    let n = (1.0 + 0.5 * ecc2 * sbeta1 * sbeta1)
        * (ctheta * sbeta1 * sbeta1 + g * sbeta1 * stheta)
        * 0.5;
    let length = h
        * (-flat * theta
            + 3.0 * flat * flat * n * stheta
            + 3.0 * flat * flat * m * (theta - stheta * ctheta) * 0.5);

    let cap_m = m * ecc2;
    let cap_n = n * ecc2;
    let delta = theta - cap_n * stheta
        + 0.5 * cap_m * (stheta * ctheta - theta)
        + 2.5 * cap_n * cap_n * stheta * ctheta
        + (cap_m * cap_m / 16.0)
            * (11.0 * theta - 13.0 * stheta * ctheta - 8.0 * theta * ctheta * ctheta
                + 10.0 * stheta * ctheta * ctheta * ctheta)
        + 0.5 * cap_m * cap_n * (3.0 * stheta + 2.0 * theta * ctheta - 5.0 * stheta * ctheta * ctheta);

    let (sdel, cdel) = delta.sin_cos();
    let f = g * cdel - sbeta1 * sdel;
    let sbeta2 = sbeta1 * cdel + g * sdel;
    let cbeta2 = (h * h + f * f).sqrt();
    let lamda = (sdel * saz).atan2(cbeta1 * cdel - sbeta1 * sdel * caz);

    DirectSolution {
        lat: (e.reqtr * sbeta2).atan2(e.rpolr * cbeta2),
        lon: ref_lon + lamda + length,
        back_azimuth: (-h).atan2(sbeta1 * sdel - g * cdel),
    }
}

/// Distance and, when asked for, the azimuths between the reference point and (lat, lon).
///
/// Identical points (exact comparison) return zero for everything.
pub fn sodano_inverse(
    ref_lat: f64,
    ref_lon: f64,
    ref_alt: f64,
    lat: f64,
    lon: f64,
    want_forward_azimuth: bool,
    want_back_azimuth: bool,
) -> InverseSolution {
    if ref_lat == lat && ref_lon == lon {
        return InverseSolution {
            distance: 0.0,
            forward_azimuth: want_forward_azimuth.then_some(0.0),
            back_azimuth: want_back_azimuth.then_some(0.0),
        };
    }

    let e = Ellipsoid::at_altitude(ref_alt);
    let flat = e.flat;
    let delta_lon = lon - ref_lon;
    let (sbet1, cbet1) = e.beta(ref_lat).sin_cos();
    let (sbet2, cbet2) = e.beta(lat).sin_cos();
    let sl = delta_lon.sin();
    let sl2 = (0.5 * delta_lon).sin();

    let a = sbet1 * sbet2;
    let b = cbet1 * cbet2;
    let cdel = a + b * delta_lon.cos();
    let n = (e.reqtr - e.rpolr) / (e.reqtr + e.rpolr);
    let b2mb1 = (lat - ref_lat)
        + 2.0 * (a * (n + n * n + n * n * n) - b * (n - n * n + n * n * n)) * (lat - ref_lat).sin();
    let d = b2mb1.sin() + 2.0 * cbet2 * sbet1 * sl2 * sl2;
    let sdel = (sl * sl * cbet2 * cbet2 + d * d).sqrt();
    let delta = sdel.atan2(cdel).abs();
    let c = b * sl / sdel;
    let m = 1.0 - c * c;
    let f2 = flat * flat;
    let d2 = delta * delta;

    let (mut forward_azimuth, mut back_azimuth) = (None, None);
    if want_forward_azimuth || want_back_azimuth {
        let lamda = delta_lon
            + c * ((flat + f2) * delta - 0.5 * a * f2 * (sdel + 2.0 * d2 / sdel)
                + 0.25 * m * f2 * (sdel * cdel - 5.0 * delta + 4.0 * d2 / delta.tan()));
        let slam = lamda.sin();
        let slam2 = (0.5 * lamda).sin();
        if want_forward_azimuth {
            forward_azimuth =
                Some((cbet2 * slam).atan2(b2mb1.sin() + 2.0 * cbet2 * sbet1 * slam2 * slam2));
        }
        if want_back_azimuth {
            back_azimuth =
                Some((-cbet1 * slam).atan2(2.0 * cbet1 * sbet2 * slam2 * slam2 - b2mb1.sin()));
        }
    }

    let distance = e.rpolr
        * ((1.0 + flat + f2) * delta + a * ((flat + f2) * sdel - f2 * d2 / (2.0 * sdel))
            - 0.5 * m * ((flat + f2) * (delta + sdel * cdel) - f2 * d2 / delta.tan())
            - 0.5 * a * a * f2 * sdel * cdel
            + (f2 * m * m / 16.0)
                * (delta + sdel * cdel - 2.0 * sdel * cdel * cdel * cdel - 8.0 * d2 / delta.tan())
            + 0.5 * a * m * f2 * (sdel * cdel * cdel + d2 / sdel));

    InverseSolution {
        distance,
        forward_azimuth,
        back_azimuth,
    }
}

/// Geodesic distance only.
pub fn sodano_distance(ref_lat: f64, ref_lon: f64, ref_alt: f64, lat: f64, lon: f64) -> f64 {
    sodano_inverse(ref_lat, ref_lon, ref_alt, lat, lon, false, false).distance
}

/// Midpoint between two geodetic positions moving west to east, and whether the path
/// crosses the dateline.
///
/// The high resolution form walks half the geodesic; otherwise latitude and longitude
/// are averaged. Altitude is always the average.
pub fn geodetic_midpoint(begin: &Vec3, end: &Vec3, high_resolution: bool) -> (Vec3, bool) {
    let alt = (begin.z + end.z) * 0.5;
    let begin_lon = ang_fix_pi(begin.y);
    let end_lon = ang_fix_pi(end.y);

    if high_resolution {
        let inverse = sodano_inverse(begin.x, begin.y, 0.0, end.x, end.y, true, false);
        let azimuth = inverse.forward_azimuth.unwrap_or(0.0);
        let mid = sodano_direct(begin.x, begin.y, 0.0, inverse.distance * 0.5, azimuth);
        return (Vec3::new(mid.lat, mid.lon, alt), begin_lon > end_lon);
    }

    let lat = ang_fix_pi2((begin.x + end.x) * 0.5);
    if begin_lon <= end_lon {
        (Vec3::new(lat, ang_fix_pi((end_lon + begin_lon) * 0.5), alt), false)
    } else {
        (
            Vec3::new(lat, ang_fix_pi((end_lon + begin_lon) * 0.5 + std::f64::consts::PI), alt),
            true,
        )
    }
}
