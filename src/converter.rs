//! Conversions between geodetic, earth-centered and local coordinate systems.
//!
//! Orientation, velocity and acceleration on geodetic and local coordinates are
//! referenced to the local level frame: velocity and acceleration are ENU, Euler angles
//! are NED (yaw clockwise from north).

use nalgebra::Matrix3;

use crate::constants::{WGS_A, WGS_B, WGS_EP2, WGS_ESQ};
use crate::coordinate::{Coordinate, CoordinateSystem, Vec3};
use crate::eci;
use crate::error::{ConversionError, Result};
use crate::math::{ang_fix_2pi, ang_fix_pi, ang_fix_pi2, are_equal, dcm_to_euler, euler_to_dcm};

/// Axis convention of a local level frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalLevelFrame {
    #[default]
    Ned,
    Nwu,
    Enu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceOriginStatus {
    #[default]
    NotSet,
    Set,
    /// Origin at or near a pole; scaled flat earth conversions are refused
    ScaledFlatEarthDegenerate,
}

/// Converts coordinates relative to a reference origin.
///
/// Setting the origin recomputes the local radii of curvature, the local-to-earth
/// rotation matrices and the tangent plane translation in one step. Conversions that
/// do not involve a local system work without an origin.
#[derive(Debug, Clone)]
pub struct ReferenceFrameConverter {
    reference_origin: Vec3,
    status: ReferenceOriginStatus,
    lat_radius: f64,
    lon_radius: f64,
    inv_lat_radius: f64,
    inv_lon_radius: f64,
    rotation_ned: Matrix3<f64>,
    rotation_enu: Matrix3<f64>,
    tangent_plane_translation: Vec3,
    tp_offset_x: f64,
    tp_offset_y: f64,
    tp_rotation: f64,
    cos_tpr: f64,
    sin_tpr: f64,
}

impl Default for ReferenceFrameConverter {
    fn default() -> Self {
        Self {
            reference_origin: Vec3::zeros(),
            status: ReferenceOriginStatus::NotSet,
            lat_radius: 0.0,
            lon_radius: 0.0,
            inv_lat_radius: 0.0,
            inv_lon_radius: 0.0,
            rotation_ned: Matrix3::identity(),
            rotation_enu: Matrix3::identity(),
            tangent_plane_translation: Vec3::zeros(),
            tp_offset_x: 0.0,
            tp_offset_y: 0.0,
            tp_rotation: 0.0,
            cos_tpr: 1.0,
            sin_tpr: 0.0,
        }
    }
}

impl ReferenceFrameConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a converter bound to `lla` (radians, radians, meters).
    pub fn with_origin(lla: &Vec3) -> Self {
        let mut cc = Self::default();
        cc.set_reference_origin(lla.x, lla.y, lla.z);
        cc
    }

    pub fn has_reference_origin(&self) -> bool {
        self.status != ReferenceOriginStatus::NotSet
    }

    pub fn status(&self) -> ReferenceOriginStatus {
        self.status
    }

    pub fn reference_origin(&self) -> &Vec3 {
        &self.reference_origin
    }

    /// Radius of curvature in the meridian
    pub fn lat_radius(&self) -> f64 {
        self.lat_radius
    }

    /// Radius of curvature in the prime vertical, scaled by cos(lat)
    pub fn lon_radius(&self) -> f64 {
        self.lon_radius
    }

    pub fn set_reference_origin_degrees(&mut self, lat: f64, lon: f64, alt: f64) {
        self.set_reference_origin(lat.to_radians(), lon.to_radians(), alt);
    }

    /// Binds the converter to a new origin and recomputes every cached quantity.
    ///
    /// Not cheap; avoid calling per frame.
    pub fn set_reference_origin(&mut self, lat: f64, lon: f64, alt: f64) {
        let fixed = Vec3::new(ang_fix_pi2(lat), ang_fix_pi(lon), alt);
        if self.has_reference_origin() && self.reference_origin == fixed {
            return;
        }
        self.reference_origin = fixed;

        let sin_lat = fixed.x.sin();
        let x = 1.0 - WGS_ESQ * sin_lat * sin_lat;
        let r_n = WGS_A / x.sqrt();
        self.lat_radius = r_n * (1.0 - WGS_ESQ) / x;
        self.lon_radius = r_n * fixed.x.cos();

        self.status = if are_equal(fixed.x.abs(), std::f64::consts::FRAC_PI_2, 1e-5) {
            ReferenceOriginStatus::ScaledFlatEarthDegenerate
        } else {
            ReferenceOriginStatus::Set
        };

        // radius of curvature in longitude goes to zero at the poles
        self.inv_lat_radius = if are_equal(self.lat_radius, 0.0, 1e-5) {
            f32::MAX as f64
        } else {
            1.0 / self.lat_radius
        };
        self.inv_lon_radius = if are_equal(self.lon_radius, 0.0, 1e-5) {
            f32::MAX as f64
        } else {
            1.0 / self.lon_radius
        };

        self.rotation_ned = local_to_earth_matrix(fixed.x, fixed.y, LocalLevelFrame::Ned);
        self.rotation_enu = local_to_earth_matrix(fixed.x, fixed.y, LocalLevelFrame::Enu);
        self.tangent_plane_translation = geodetic_to_ecef(&fixed);
    }

    pub fn set_tangent_plane_rotation(&mut self, angle: f64) {
        self.tp_rotation = angle;
        (self.sin_tpr, self.cos_tpr) = angle.sin_cos();
    }

    /// `x_shift`/`y_shift` are the east/north distances of the shifted origin from the
    /// tangent point; `angle` rotates the plane clockwise from true north.
    pub fn set_tangent_plane_offsets(&mut self, x_shift: f64, y_shift: f64, angle: f64) {
        self.tp_offset_x = x_shift;
        self.tp_offset_y = y_shift;
        self.set_tangent_plane_rotation(angle);
    }

    /// Shifts and rotates an X-East coordinate into the offset tangent plane.
    pub fn apply_tangent_plane_offset_rotate(&self, tp: &Coordinate) -> Result<Coordinate> {
        expect_system(tp, CoordinateSystem::XEast, "X-East")?;
        let (c, s) = (self.cos_tpr, self.sin_tpr);
        let rotate = |v: &Vec3| Vec3::new(v.x * c - v.y * s, v.x * s + v.y * c, v.z);

        let dx = tp.position.x - self.tp_offset_x;
        let dy = tp.position.y - self.tp_offset_y;
        Ok(Coordinate {
            system: CoordinateSystem::Gtp,
            position: Vec3::new(dx * c - dy * s, dx * s + dy * c, tp.position.z),
            orientation: tp
                .orientation
                .map(|o| Vec3::new(ang_fix_2pi(o.x - self.tp_rotation), o.y, o.z)),
            velocity: tp.velocity.as_ref().map(rotate),
            acceleration: tp.acceleration.as_ref().map(rotate),
            elapsed_eci_time: tp.elapsed_eci_time,
        })
    }

    /// Inverse of [`Self::apply_tangent_plane_offset_rotate`].
    pub fn reverse_tangent_plane_offset_rotate(&self, gtp: &Coordinate) -> Result<Coordinate> {
        expect_system(gtp, CoordinateSystem::Gtp, "GTP")?;
        let (c, s) = (self.cos_tpr, self.sin_tpr);
        let rotate = |v: &Vec3| Vec3::new(v.x * c + v.y * s, -v.x * s + v.y * c, v.z);

        let p = &gtp.position;
        Ok(Coordinate {
            system: CoordinateSystem::XEast,
            position: Vec3::new(
                (p.x * c + p.y * s) + self.tp_offset_x,
                (-p.x * s + p.y * c) + self.tp_offset_y,
                p.z,
            ),
            orientation: gtp
                .orientation
                .map(|o| Vec3::new(ang_fix_2pi(o.x + self.tp_rotation), o.y, o.z)),
            velocity: gtp.velocity.as_ref().map(rotate),
            acceleration: gtp.acceleration.as_ref().map(rotate),
            elapsed_eci_time: gtp.elapsed_eci_time,
        })
    }

    /// Converts `input` into `out_system`.
    ///
    /// Fields absent on the input stay absent on the output. The elapsed ECI time is
    /// carried through every path.
    pub fn convert(&self, input: &Coordinate, out_system: CoordinateSystem) -> Result<Coordinate> {
        use CoordinateSystem::*;

        if input.system == out_system {
            return Ok(input.clone());
        }

        let mut out = match (input.system, out_system) {
            (Gtp, _) | (_, Gtp) => {
                return Err(ConversionError::UnsupportedConversion {
                    from: input.system,
                    to: out_system,
                })
            }

            (Lla, Ned | Nwu | Enu) => self.geodetic_to_flat(input, out_system)?,
            (Lla, Ecef) => geodetic_coordinate_to_ecef(input, LocalLevelFrame::Ned)?,
            (Lla, XEast) => self.geodetic_to_x_east(input)?,
            (Lla, Eci) => {
                let ecef = geodetic_coordinate_to_ecef(input, LocalLevelFrame::Ned)?;
                eci::ecef_to_eci(&ecef)?
            }

            (Ned | Nwu | Enu, Ned | Nwu | Enu) => swap_flat(input, out_system),
            (Ned | Nwu | Enu, Lla) => self.flat_to_geodetic(input)?,
            (Ned | Nwu | Enu, Ecef) => self.flat_to_ecef(input)?,
            (Ned | Nwu | Enu, Eci) => eci::ecef_to_eci(&self.flat_to_ecef(input)?)?,
            (Ned | Nwu | Enu, XEast) => self.ecef_to_x_east(&self.flat_to_ecef(input)?)?,

            (Ecef, Ned | Nwu | Enu) => self.ecef_to_flat(input, out_system)?,
            (Ecef, Lla) => ecef_coordinate_to_geodetic(input, LocalLevelFrame::Ned)?,
            (Ecef, Eci) => eci::ecef_to_eci(input)?,
            (Ecef, XEast) => self.ecef_to_x_east(input)?,

            (XEast, Ned | Nwu | Enu) => {
                self.ecef_to_flat(&self.x_east_to_ecef(input)?, out_system)?
            }
            (XEast, Lla) => self.x_east_to_geodetic(input)?,
            (XEast, Ecef) => self.x_east_to_ecef(input)?,
            (XEast, Eci) => eci::ecef_to_eci(&self.x_east_to_ecef(input)?)?,

            (Eci, _) => {
                let ecef = eci::eci_to_ecef(input)?;
                return self.convert(&ecef, out_system);
            }

            // same-system pairs returned above
            (Lla, Lla) | (Ecef, Ecef) | (XEast, XEast) => input.clone(),
        };
        out.system = out_system;
        out.elapsed_eci_time = input.elapsed_eci_time;
        Ok(out)
    }

    fn require_flat_earth_origin(&self) -> Result<()> {
        match self.status {
            ReferenceOriginStatus::NotSet => Err(ConversionError::NoReferenceOrigin),
            ReferenceOriginStatus::ScaledFlatEarthDegenerate => {
                Err(ConversionError::DegenerateOrigin)
            }
            ReferenceOriginStatus::Set => Ok(()),
        }
    }

    fn require_origin(&self) -> Result<()> {
        if self.has_reference_origin() {
            Ok(())
        } else {
            Err(ConversionError::NoReferenceOrigin)
        }
    }

    fn geodetic_to_flat(&self, lla: &Coordinate, system: CoordinateSystem) -> Result<Coordinate> {
        self.require_flat_earth_origin()?;
        expect_system(lla, CoordinateSystem::Lla, "LLA")?;

        let origin = &self.reference_origin;
        let d_lat = ang_fix_pi2(lla.lat() - origin.x) * self.lat_radius;
        let d_lon = ang_fix_pi(lla.lon() - origin.y) * self.lon_radius;
        let d_alt = lla.alt() - origin.z;

        let mut flat = match system {
            CoordinateSystem::Ned => lla.map_vectors(system, swap_ned_enu),
            CoordinateSystem::Nwu => lla.map_vectors(system, enu_to_nwu),
            _ => lla.map_vectors(system, |v| *v),
        };
        flat.position = match system {
            CoordinateSystem::Ned => Vec3::new(d_lat, d_lon, -d_alt),
            CoordinateSystem::Nwu => Vec3::new(d_lat, -d_lon, d_alt),
            _ => Vec3::new(d_lon, d_lat, d_alt),
        };
        Ok(flat)
    }

    fn flat_to_geodetic(&self, flat: &Coordinate) -> Result<Coordinate> {
        self.require_flat_earth_origin()?;

        let origin = &self.reference_origin;
        let p = &flat.position;
        let (mut lla, north, east, up) = match flat.system {
            CoordinateSystem::Ned => (
                flat.map_vectors(CoordinateSystem::Lla, swap_ned_enu),
                p.x,
                p.y,
                -p.z,
            ),
            CoordinateSystem::Nwu => (
                flat.map_vectors(CoordinateSystem::Lla, nwu_to_enu),
                p.x,
                -p.y,
                p.z,
            ),
            CoordinateSystem::Enu => (
                flat.map_vectors(CoordinateSystem::Lla, |v| *v),
                p.y,
                p.x,
                p.z,
            ),
            found => {
                return Err(ConversionError::InvalidSystem {
                    expected: "ENU, NED or NWU",
                    found,
                })
            }
        };
        lla.position = Vec3::new(
            north * self.inv_lat_radius + origin.x,
            east * self.inv_lon_radius + origin.y,
            up + origin.z,
        );
        Ok(lla)
    }

    fn ecef_to_flat(&self, ecef: &Coordinate, system: CoordinateSystem) -> Result<Coordinate> {
        self.require_flat_earth_origin()?;
        let lla = ecef_coordinate_to_geodetic(ecef, LocalLevelFrame::Ned)?;
        self.geodetic_to_flat(&lla, system)
    }

    fn flat_to_ecef(&self, flat: &Coordinate) -> Result<Coordinate> {
        let lla = self.flat_to_geodetic(flat)?;
        geodetic_coordinate_to_ecef(&lla, LocalLevelFrame::Ned)
    }

    fn ecef_to_x_east(&self, ecef: &Coordinate) -> Result<Coordinate> {
        self.require_origin()?;
        expect_system(ecef, CoordinateSystem::Ecef, "ECEF")?;

        let r = &self.rotation_enu;
        let mut tp = ecef.map_vectors(CoordinateSystem::XEast, |v| r * v);
        tp.position = r * (ecef.position - self.tangent_plane_translation);
        tp.orientation = ecef.orientation.map(|ori| {
            let be = euler_to_dcm(&ori);
            dcm_to_euler(&(be * self.rotation_ned.transpose()))
        });
        Ok(tp)
    }

    fn x_east_to_ecef(&self, tp: &Coordinate) -> Result<Coordinate> {
        self.require_origin()?;
        expect_system(tp, CoordinateSystem::XEast, "X-East")?;

        let rt = self.rotation_enu.transpose();
        let mut ecef = tp.map_vectors(CoordinateSystem::Ecef, |v| rt * v);
        ecef.position = rt * tp.position + self.tangent_plane_translation;
        ecef.orientation = tp.orientation.map(|ori| {
            let bl = euler_to_dcm(&ori);
            dcm_to_euler(&(bl * self.rotation_ned))
        });
        Ok(ecef)
    }

    // Orientation is local level on both sides of the geodetic/X-East pair and is
    // passed through untouched.
    fn geodetic_to_x_east(&self, lla: &Coordinate) -> Result<Coordinate> {
        self.require_origin()?;
        expect_system(lla, CoordinateSystem::Lla, "LLA")?;

        let mut no_ori = lla.clone();
        no_ori.orientation = None;
        let ecef = geodetic_coordinate_to_ecef(&no_ori, LocalLevelFrame::Ned)?;
        let mut tp = self.ecef_to_x_east(&ecef)?;
        tp.orientation = lla.orientation;
        Ok(tp)
    }

    fn x_east_to_geodetic(&self, tp: &Coordinate) -> Result<Coordinate> {
        self.require_origin()?;
        expect_system(tp, CoordinateSystem::XEast, "X-East")?;

        let mut no_ori = tp.clone();
        no_ori.orientation = None;
        let ecef = self.x_east_to_ecef(&no_ori)?;
        let mut lla = ecef_coordinate_to_geodetic(&ecef, LocalLevelFrame::Ned)?;
        lla.orientation = tp.orientation;
        Ok(lla)
    }
}

fn expect_system(c: &Coordinate, system: CoordinateSystem, expected: &'static str) -> Result<()> {
    if c.system == system {
        Ok(())
    } else {
        Err(ConversionError::InvalidSystem {
            expected,
            found: c.system,
        })
    }
}

fn swap_flat(input: &Coordinate, out_system: CoordinateSystem) -> Coordinate {
    use CoordinateSystem::*;
    match (input.system, out_system) {
        (Ned, Enu) | (Enu, Ned) => input.map_vectors(out_system, swap_ned_enu),
        (Ned, Nwu) | (Nwu, Ned) => input.map_vectors(out_system, swap_ned_nwu),
        (Enu, Nwu) => input.map_vectors(out_system, enu_to_nwu),
        (Nwu, Enu) => input.map_vectors(out_system, nwu_to_enu),
        _ => input.clone(),
    }
}

/// NED <-> ENU: (y, x, -z)
pub fn swap_ned_enu(v: &Vec3) -> Vec3 {
    Vec3::new(v.y, v.x, -v.z)
}

/// NED <-> NWU: (x, -y, -z)
pub fn swap_ned_nwu(v: &Vec3) -> Vec3 {
    Vec3::new(v.x, -v.y, -v.z)
}

pub fn enu_to_nwu(v: &Vec3) -> Vec3 {
    Vec3::new(v.y, -v.x, v.z)
}

pub fn nwu_to_enu(v: &Vec3) -> Vec3 {
    Vec3::new(-v.y, v.x, v.z)
}

/// Rotation from ECEF into the local level frame at (lat, lon); rows are the local
/// axes expressed in ECEF.
#[rustfmt::skip]
pub fn local_to_earth_matrix(lat: f64, lon: f64, frame: LocalLevelFrame) -> Matrix3<f64> {
    let (slat, clat) = lat.sin_cos();
    let (slon, clon) = lon.sin_cos();

    match frame {
        LocalLevelFrame::Ned => Matrix3::new(
            -slat * clon, -slat * slon, clat,
            -slon, clon, 0.0,
            -clat * clon, -clat * slon, -slat,
        ),
        LocalLevelFrame::Nwu => Matrix3::new(
            -slat * clon, -slat * slon, clat,
            slon, -clon, 0.0,
            clat * clon, clat * slon, slat,
        ),
        LocalLevelFrame::Enu => Matrix3::new(
            -slon, clon, 0.0,
            -slat * clon, -slat * slon, clat,
            clat * clon, clat * slon, slat,
        ),
    }
}

/// Geodetic position (radians, radians, meters) to ECEF meters on the WGS-84 ellipsoid.
pub fn geodetic_to_ecef(lla: &Vec3) -> Vec3 {
    let (s_lat, c_lat) = lla.x.sin_cos();
    let (s_lon, c_lon) = lla.y.sin_cos();
    let n = WGS_A / (1.0 - WGS_ESQ * s_lat * s_lat).sqrt();

    Vec3::new(
        (n + lla.z) * c_lat * c_lon,
        (n + lla.z) * c_lat * s_lon,
        (n * (1.0 - WGS_ESQ) + lla.z) * s_lat,
    )
}

/// ECEF meters to a geodetic position. The latitude starts from the closed form of
/// Toms (1996) and is polished with Bowring iterations.
pub fn ecef_to_geodetic(ecef: &Vec3) -> Vec3 {
    let mut lat = 0.0;
    let mut at_pole = false;
    let lon = if ecef.x != 0.0 {
        ecef.y.atan2(ecef.x)
    } else if ecef.y > 0.0 {
        std::f64::consts::FRAC_PI_2
    } else if ecef.y < 0.0 {
        -std::f64::consts::FRAC_PI_2
    } else {
        at_pole = true;
        if ecef.z > 0.0 {
            lat = std::f64::consts::FRAC_PI_2;
        } else if ecef.z < 0.0 {
            lat = -std::f64::consts::FRAC_PI_2;
        } else {
            // center of the earth
            return Vec3::new(std::f64::consts::FRAC_PI_2, 0.0, -WGS_B);
        }
        0.0
    };

    let w2 = ecef.x * ecef.x + ecef.y * ecef.y;
    let w = w2.sqrt();
    let t0 = ecef.z * 1.0026;
    let s0 = (t0 * t0 + w2).sqrt();
    let sin_b0 = t0 / s0;
    let cos_b0 = w / s0;
    let t1 = ecef.z + WGS_B * WGS_EP2 * sin_b0 * sin_b0 * sin_b0;
    let sum = w - WGS_A * WGS_ESQ * cos_b0 * cos_b0 * cos_b0;
    let s1 = (t1 * t1 + sum * sum).sqrt();
    let sin_p1 = t1 / s1;
    let cos_p1 = sum / s1;
    if !at_pole {
        lat = (sin_p1 / cos_p1).atan();
        // two Bowring refinements take the single-pass estimate below a micrometer
        for _ in 0..2 {
            let sin_lat = lat.sin();
            let n = WGS_A / (1.0 - WGS_ESQ * sin_lat * sin_lat).sqrt();
            let h = surface_height(w, ecef.z, lat);
            lat = ecef.z.atan2(w * (1.0 - WGS_ESQ * n / (n + h)));
        }
    }
    let alt = surface_height(w, ecef.z, lat);
    Vec3::new(lat, lon, alt)
}

/// Height above the ellipsoid of the point at distance `w` from the polar axis and `z`
/// above the equator, given its geodetic latitude.
fn surface_height(w: f64, z: f64, lat: f64) -> f64 {
    let (sin_lat, cos_lat) = lat.sin_cos();
    w * cos_lat + z * sin_lat - WGS_A * (1.0 - WGS_ESQ * sin_lat * sin_lat).sqrt()
}

/// Converts a full geodetic state to ECEF. `frame` names the local level convention of
/// the input velocity, acceleration and orientation.
pub fn geodetic_coordinate_to_ecef(lla: &Coordinate, frame: LocalLevelFrame) -> Result<Coordinate> {
    expect_system(lla, CoordinateSystem::Lla, "LLA")?;

    let le = local_to_earth_matrix(lla.lat(), lla.lon(), frame);
    let to_local = |v: &Vec3| match frame {
        LocalLevelFrame::Ned => swap_ned_enu(v),
        LocalLevelFrame::Nwu => enu_to_nwu(v),
        LocalLevelFrame::Enu => *v,
    };

    let mut ecef = lla.blank_as(CoordinateSystem::Ecef);
    ecef.position = geodetic_to_ecef(&lla.position);
    ecef.orientation = lla
        .orientation
        .map(|ori| dcm_to_euler(&(euler_to_dcm(&ori) * le)));
    ecef.velocity = lla.velocity.map(|v| le.transpose() * to_local(&v));
    ecef.acceleration = lla.acceleration.map(|a| le.transpose() * to_local(&a));
    Ok(ecef)
}

/// Converts a full ECEF state to geodetic, expressing velocity and acceleration as ENU.
pub fn ecef_coordinate_to_geodetic(ecef: &Coordinate, frame: LocalLevelFrame) -> Result<Coordinate> {
    expect_system(ecef, CoordinateSystem::Ecef, "ECEF")?;

    let mut lla = ecef.blank_as(CoordinateSystem::Lla);
    lla.position = ecef_to_geodetic(&ecef.position);

    let le = local_to_earth_matrix(lla.lat(), lla.lon(), frame);
    let to_enu = |v: Vec3| match frame {
        LocalLevelFrame::Ned => swap_ned_enu(&v),
        LocalLevelFrame::Nwu => nwu_to_enu(&v),
        LocalLevelFrame::Enu => v,
    };

    lla.orientation = ecef
        .orientation
        .map(|ori| dcm_to_euler(&(euler_to_dcm(&ori) * le.transpose())));
    lla.velocity = ecef.velocity.map(|v| to_enu(le * v));
    lla.acceleration = ecef.acceleration.map(|a| to_enu(le * a));
    Ok(lla)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn deg(lat: f64, lon: f64, alt: f64) -> Vec3 {
        Vec3::new(lat.to_radians(), lon.to_radians(), alt)
    }

    #[test]
    fn geodetic_ecef_round_trip() {
        for lla in [
            deg(0.0, 0.0, 0.0),
            deg(38.89511, -77.03637, 120.0),
            deg(-45.0, 170.0, 400_000.0),
            deg(80.0, -10.0, -400.0),
            deg(10.0, 90.0, 10_000.0),
        ] {
            let back = ecef_to_geodetic(&geodetic_to_ecef(&lla));
            assert_relative_eq!(back.x, lla.x, epsilon = 1e-7);
            assert_relative_eq!(back.y, lla.y, epsilon = 1e-7);
            assert_relative_eq!(back.z, lla.z, epsilon = 1e-3);
        }
    }

    #[test]
    fn altitude_survives_round_trip_at_every_latitude() {
        let mut worst = 0.0f64;
        for lat in -89..=89 {
            for alt in [0.0, 120.0, 2500.0, 1.0e4] {
                let lla = deg(lat as f64, 37.0, alt);
                let back = ecef_to_geodetic(&geodetic_to_ecef(&lla));
                worst = worst.max((back.z - alt).abs());
                assert_relative_eq!(back.x, lla.x, epsilon = 1e-11);
            }
        }
        assert!(worst < 1e-6, "worst altitude error {}", worst);
    }

    #[test]
    fn ecef_axes() {
        let p = geodetic_to_ecef(&Vec3::zeros());
        assert_relative_eq!(p, Vec3::new(WGS_A, 0.0, 0.0), epsilon = 1e-6);

        let pole = ecef_to_geodetic(&Vec3::new(0.0, 0.0, WGS_B + 100.0));
        assert_relative_eq!(pole.x, std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(pole.z, 100.0, epsilon = 1e-6);

        let center = ecef_to_geodetic(&Vec3::zeros());
        assert_eq!(center.z, -WGS_B);
    }

    #[test]
    fn conversions_without_origin_fail() {
        let cc = ReferenceFrameConverter::new();
        let c = Coordinate::lla(0.1, 0.1, 0.0);
        assert_eq!(
            cc.convert(&c, CoordinateSystem::Enu),
            Err(ConversionError::NoReferenceOrigin)
        );
        assert_eq!(
            cc.convert(&c, CoordinateSystem::XEast),
            Err(ConversionError::NoReferenceOrigin)
        );
        // earth-centered conversions need no origin
        assert!(cc.convert(&c, CoordinateSystem::Ecef).is_ok());
    }

    #[test]
    fn polar_origin_is_degenerate_for_flat_earth() {
        let mut cc = ReferenceFrameConverter::new();
        cc.set_reference_origin_degrees(90.0, 0.0, 0.0);
        assert_eq!(cc.status(), ReferenceOriginStatus::ScaledFlatEarthDegenerate);

        let c = Coordinate::lla(1.5, 0.0, 0.0);
        assert_eq!(
            cc.convert(&c, CoordinateSystem::Ned),
            Err(ConversionError::DegenerateOrigin)
        );
        // tangent plane is still meaningful at the pole
        assert!(cc.convert(&c, CoordinateSystem::XEast).is_ok());

        cc.set_reference_origin_degrees(45.0, 0.0, 0.0);
        assert_eq!(cc.status(), ReferenceOriginStatus::Set);
        assert!(cc.convert(&c, CoordinateSystem::Ned).is_ok());
    }

    #[test]
    fn gtp_is_unsupported() {
        let cc = ReferenceFrameConverter::with_origin(&deg(10.0, 10.0, 0.0));
        let c = Coordinate::lla(0.1, 0.1, 0.0);
        assert_eq!(
            cc.convert(&c, CoordinateSystem::Gtp),
            Err(ConversionError::UnsupportedConversion {
                from: CoordinateSystem::Lla,
                to: CoordinateSystem::Gtp,
            })
        );
    }

    #[test]
    fn x_east_round_trip() {
        let origin = deg(38.9, -77.0, 50.0);
        let cc = ReferenceFrameConverter::with_origin(&origin);
        let p = Coordinate::new(CoordinateSystem::Lla, deg(39.29038, -76.61219, 1500.0))
            .with_orientation(Vec3::new(0.3, 0.1, -0.2))
            .with_velocity(Vec3::new(100.0, -20.0, 5.0));

        let tp = cc.convert(&p, CoordinateSystem::XEast).unwrap();
        assert_eq!(tp.orientation, p.orientation);
        let back = cc.convert(&tp, CoordinateSystem::Lla).unwrap();
        assert_relative_eq!(back.lat(), p.lat(), epsilon = 1e-7);
        assert_relative_eq!(back.lon(), p.lon(), epsilon = 1e-7);
        assert_relative_eq!(back.alt(), p.alt(), epsilon = 1e-3);
        assert_relative_eq!(back.velocity.unwrap(), p.velocity.unwrap(), epsilon = 1e-9);
        assert!(back.acceleration.is_none());
    }

    #[test]
    fn origin_maps_to_x_east_zero() {
        let origin = deg(-33.0, 151.0, 25.0);
        let cc = ReferenceFrameConverter::with_origin(&origin);
        let tp = cc
            .convert(&Coordinate::new(CoordinateSystem::Lla, origin), CoordinateSystem::XEast)
            .unwrap();
        assert_relative_eq!(tp.position, Vec3::zeros(), epsilon = 1e-6);

        // a point directly overhead is straight up the z axis
        let up = cc
            .convert(
                &Coordinate::new(CoordinateSystem::Lla, deg(-33.0, 151.0, 1025.0)),
                CoordinateSystem::XEast,
            )
            .unwrap();
        assert_relative_eq!(up.position, Vec3::new(0.0, 0.0, 1000.0), epsilon = 1e-6);
    }

    #[test]
    fn wrapped_origin_matches_its_canonical_form() {
        let wrapped = ReferenceFrameConverter::with_origin(&deg(10.0, 190.0, 0.0));
        let canonical = ReferenceFrameConverter::with_origin(&deg(10.0, -170.0, 0.0));
        let p = Coordinate::new(CoordinateSystem::Lla, deg(10.2, -169.7, 300.0));

        for system in [CoordinateSystem::XEast, CoordinateSystem::Enu] {
            let a = wrapped.convert(&p, system).unwrap();
            let b = canonical.convert(&p, system).unwrap();
            assert_relative_eq!(a.position, b.position, epsilon = 1e-6);
        }
    }

    #[test]
    fn flat_earth_axes() {
        let origin = deg(20.0, 30.0, 0.0);
        let cc = ReferenceFrameConverter::with_origin(&origin);
        let north = Coordinate::lla(origin.x + 1e-4, origin.y, 10.0)
            .with_velocity(Vec3::new(1.0, 2.0, 3.0));

        let enu = cc.convert(&north, CoordinateSystem::Enu).unwrap();
        assert_relative_eq!(enu.position.x, 0.0);
        assert_relative_eq!(enu.position.y, 1e-4 * cc.lat_radius(), epsilon = 1e-6);
        assert_relative_eq!(enu.position.z, 10.0);
        assert_eq!(enu.velocity, Some(Vec3::new(1.0, 2.0, 3.0)));

        let ned = cc.convert(&north, CoordinateSystem::Ned).unwrap();
        assert_relative_eq!(ned.position.x, enu.position.y);
        assert_relative_eq!(ned.position.z, -10.0);
        assert_eq!(ned.velocity, Some(Vec3::new(2.0, 1.0, -3.0)));

        let nwu = cc.convert(&enu, CoordinateSystem::Nwu).unwrap();
        assert_relative_eq!(nwu.position, Vec3::new(enu.position.y, 0.0, 10.0));

        for flat in [&enu, &ned, &nwu] {
            let back = cc.convert(flat, CoordinateSystem::Lla).unwrap();
            assert_relative_eq!(back.position, north.position, epsilon = 1e-12);
            assert_relative_eq!(back.velocity.unwrap(), north.velocity.unwrap(), epsilon = 1e-12);
        }
    }

    #[test]
    fn geodetic_ecef_orientation_and_velocity_round_trip() {
        let lla = Coordinate::new(CoordinateSystem::Lla, deg(51.5, -0.12, 300.0))
            .with_orientation(Vec3::new(1.0, 0.2, -0.1))
            .with_velocity(Vec3::new(10.0, 20.0, -3.0))
            .with_acceleration(Vec3::new(0.1, 0.0, -9.8));

        for frame in [LocalLevelFrame::Ned, LocalLevelFrame::Nwu, LocalLevelFrame::Enu] {
            let ecef = geodetic_coordinate_to_ecef(&lla, frame).unwrap();
            let back = ecef_coordinate_to_geodetic(&ecef, frame).unwrap();
            assert_relative_eq!(back.orientation.unwrap(), lla.orientation.unwrap(), epsilon = 1e-9);
            assert_relative_eq!(back.velocity.unwrap(), lla.velocity.unwrap(), epsilon = 1e-9);
            assert_relative_eq!(
                back.acceleration.unwrap(),
                lla.acceleration.unwrap(),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn tangent_plane_offset_rotate_round_trip() {
        let mut cc = ReferenceFrameConverter::with_origin(&deg(0.0, 0.0, 0.0));
        cc.set_tangent_plane_offsets(100.0, -50.0, 0.5);

        let tp = Coordinate::new(CoordinateSystem::XEast, Vec3::new(1000.0, 2000.0, 30.0))
            .with_orientation(Vec3::new(1.0, 0.0, 0.0))
            .with_velocity(Vec3::new(5.0, 6.0, 7.0));
        let gtp = cc.apply_tangent_plane_offset_rotate(&tp).unwrap();
        assert_eq!(gtp.system, CoordinateSystem::Gtp);
        assert_relative_eq!(gtp.orientation.unwrap().x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(gtp.velocity.unwrap().norm(), tp.velocity.unwrap().norm());

        let back = cc.reverse_tangent_plane_offset_rotate(&gtp).unwrap();
        assert_relative_eq!(back.position, tp.position, epsilon = 1e-9);
        assert_relative_eq!(back.velocity.unwrap(), tp.velocity.unwrap(), epsilon = 1e-12);
        assert_relative_eq!(back.orientation.unwrap(), tp.orientation.unwrap(), epsilon = 1e-12);

        assert!(cc.reverse_tangent_plane_offset_rotate(&tp).is_err());
    }

    #[test]
    fn same_system_is_a_copy() {
        let cc = ReferenceFrameConverter::new();
        let c = Coordinate::new(CoordinateSystem::Ned, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(cc.convert(&c, CoordinateSystem::Ned), Ok(c));
    }
}
