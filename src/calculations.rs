//! Relative geometry between a "from" and a "to" entity.
//!
//! Every calculation takes an [`EarthModel`] choosing the frame the two positions are
//! compared in. Geodetic positions are (lat, lon, alt) in radians and meters, orientations
//! are (yaw, pitch, roll) in radians, and velocities are ENU in m/s.

use serde::Deserialize;
use std::fmt;

use crate::constants::{
    DEFAULT_OPTICAL_RADIUS, DEFAULT_RF_RADIUS, EARTH_RADIUS, WGS_A, WGS_A2, WGS_B, WGS_B2,
};
use crate::converter::{
    ecef_to_geodetic, geodetic_coordinate_to_ecef, geodetic_to_ecef, local_to_earth_matrix,
    LocalLevelFrame, ReferenceFrameConverter,
};
use crate::coordinate::{Coordinate, CoordinateSystem, Vec3};
use crate::error::{ConversionError, Result};
use crate::geodesics::sodano_distance;
use crate::math::{
    ang_fix_2pi, are_equal, body_unit_x, dcm_to_euler, euler_to_dcm, inverse_cosine, v3_angle,
    v3_rot_x, v3_rot_y, yaw_pitch_from_body_unit_x, DEFAULT_TOLERANCE,
};

/// Earth model a calculation compares positions in.
#[derive(Debug, Clone, Copy)]
pub enum EarthModel<'a> {
    /// Ellipsoidal, through ECEF; angles from a tangent plane at "from"
    Wgs84,
    /// Tangent plane centred on "from", rebuilt per call
    TangentPlaneWgs84,
    /// Scaled flat earth around the converter's fixed reference origin
    FlatEarth(&'a ReferenceFrameConverter),
    /// Sphere of radius [`EARTH_RADIUS`]
    PerfectSphere,
}

impl<'a> EarthModel<'a> {
    /// Flat earth model, refusing a converter without a reference origin.
    pub fn flat_earth(converter: &'a ReferenceFrameConverter) -> Result<Self> {
        if converter.has_reference_origin() {
            Ok(EarthModel::FlatEarth(converter))
        } else {
            Err(ConversionError::MissingConverter("flat earth model"))
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EarthModel::Wgs84 => "WGS-84",
            EarthModel::TangentPlaneWgs84 => "tangent plane WGS-84",
            EarthModel::FlatEarth(_) => "flat earth",
            EarthModel::PerfectSphere => "perfect sphere",
        }
    }

    fn unsupported(&self, operation: &'static str) -> ConversionError {
        ConversionError::UnsupportedModel {
            operation,
            model: self.name(),
        }
    }
}

impl fmt::Display for EarthModel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Earth model named in configuration, bound to a converter with [`EarthModelKind::bind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EarthModelKind {
    #[default]
    Wgs84,
    TangentPlaneWgs84,
    FlatEarth,
    PerfectSphere,
}

impl EarthModelKind {
    pub fn bind(self, converter: &ReferenceFrameConverter) -> Result<EarthModel<'_>> {
        match self {
            EarthModelKind::Wgs84 => Ok(EarthModel::Wgs84),
            EarthModelKind::TangentPlaneWgs84 => Ok(EarthModel::TangentPlaneWgs84),
            EarthModelKind::FlatEarth => EarthModel::flat_earth(converter),
            EarthModelKind::PerfectSphere => Ok(EarthModel::PerfectSphere),
        }
    }
}

/// Which of azimuth, elevation and composite angle to compute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AngleRequest {
    pub azimuth: bool,
    pub elevation: bool,
    pub composite: bool,
}

impl AngleRequest {
    pub const ALL: Self = Self {
        azimuth: true,
        elevation: true,
        composite: true,
    };
    pub const AZIMUTH: Self = Self {
        azimuth: true,
        elevation: false,
        composite: false,
    };
    pub const AZIMUTH_ELEVATION: Self = Self {
        azimuth: true,
        elevation: true,
        composite: false,
    };

    pub fn is_empty(&self) -> bool {
        !(self.azimuth || self.elevation || self.composite)
    }
}

/// Angles in radians; `None` for anything not requested.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Angles {
    pub azimuth: Option<f64>,
    pub elevation: Option<f64>,
    pub composite: Option<f64>,
}

/// Which of down-range, cross-range and down value to compute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeRequest {
    pub down_range: bool,
    pub cross_range: bool,
    pub down_value: bool,
}

impl RangeRequest {
    pub const ALL: Self = Self {
        down_range: true,
        cross_range: true,
        down_value: true,
    };

    pub fn is_empty(&self) -> bool {
        !(self.down_range || self.cross_range || self.down_value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DownRangeValues {
    pub down_range: Option<f64>,
    pub cross_range: Option<f64>,
    /// Distance below the horizontal plane through "from"; negative above it
    pub down_value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizonKind {
    #[default]
    Geometric,
    Optical,
    Radar,
}

fn lla(position: &Vec3) -> Coordinate {
    Coordinate::new(CoordinateSystem::Lla, *position)
}

fn local_position(
    converter: &ReferenceFrameConverter,
    position: &Vec3,
    system: CoordinateSystem,
) -> Result<Vec3> {
    Ok(converter.convert(&lla(position), system)?.position)
}

fn flat_earth_converter<'a>(
    converter: &'a ReferenceFrameConverter,
    operation: &'static str,
) -> Result<&'a ReferenceFrameConverter> {
    if converter.has_reference_origin() {
        Ok(converter)
    } else {
        Err(ConversionError::MissingConverter(operation))
    }
}

/// "from" and "to" positions in the model's local Cartesian frame: X-East on a plane at
/// "from", or ENU around the flat earth origin.
fn local_pair(
    from_lla: &Vec3,
    to_lla: &Vec3,
    model: EarthModel<'_>,
    operation: &'static str,
) -> Result<(Vec3, Vec3)> {
    match model {
        EarthModel::Wgs84 | EarthModel::TangentPlaneWgs84 => {
            let converter = ReferenceFrameConverter::with_origin(from_lla);
            Ok((
                local_position(&converter, from_lla, CoordinateSystem::XEast)?,
                local_position(&converter, to_lla, CoordinateSystem::XEast)?,
            ))
        }
        EarthModel::FlatEarth(converter) => {
            let converter = flat_earth_converter(converter, operation)?;
            Ok((
                local_position(converter, from_lla, CoordinateSystem::Enu)?,
                local_position(converter, to_lla, CoordinateSystem::Enu)?,
            ))
        }
        EarthModel::PerfectSphere => Err(model.unsupported(operation)),
    }
}

/// Line of sight from "from" to "to" as an ENU vector.
fn line_of_sight(
    from_lla: &Vec3,
    to_lla: &Vec3,
    model: EarthModel<'_>,
    operation: &'static str,
) -> Result<Vec3> {
    match model {
        EarthModel::Wgs84 | EarthModel::TangentPlaneWgs84 => {
            let converter = ReferenceFrameConverter::with_origin(from_lla);
            local_position(&converter, to_lla, CoordinateSystem::XEast)
        }
        EarthModel::FlatEarth(_) => {
            let (from, to) = local_pair(from_lla, to_lla, model, operation)?;
            Ok(to - from)
        }
        EarthModel::PerfectSphere => Ok(sphere_to_tangent_plane(
            from_lla,
            &geodetic_to_spherical(to_lla),
            None,
        )),
    }
}

/// Decomposes an ENU vector into angles relative to the orientation `ref_ori`.
///
/// Azimuth and elevation come from rotating the pointing direction into the body frame;
/// the composite angle is measured against the body x axis expressed in ENU.
pub fn calculate_rel_ang(enu: &Vec3, ref_ori: &Vec3, request: AngleRequest) -> Result<Angles> {
    if request.is_empty() {
        return Err(ConversionError::NoOutputRequested("calculate_rel_ang"));
    }

    let mut out = Angles::default();
    if request.azimuth || request.elevation {
        let dcm = euler_to_dcm(ref_ori);
        let pointing = body_unit_x(enu.x.atan2(enu.y), enu.z.atan2(enu.x.hypot(enu.y)));
        let (az, el) = yaw_pitch_from_body_unit_x(&(dcm * pointing));
        if request.azimuth {
            out.azimuth = Some(az);
        }
        if request.elevation {
            out.elevation = Some(el);
        }
    }
    if request.composite {
        let (s_yaw, c_yaw) = ref_ori.x.sin_cos();
        let (s_pitch, c_pitch) = ref_ori.y.sin_cos();
        let reference = Vec3::new(s_yaw * c_pitch, c_yaw * c_pitch, s_pitch);
        out.composite = Some(v3_angle(&reference, enu));
    }
    Ok(out)
}

/// Body relative angles from orientation `ref_ori` toward a true azimuth and elevation.
pub fn rel_ang_to_true_az_el(
    true_az: f64,
    true_el: f64,
    ref_ori: &Vec3,
    request: AngleRequest,
) -> Result<Angles> {
    let ned = body_unit_x(true_az, true_el);
    calculate_rel_ang(&Vec3::new(ned.y, ned.x, -ned.z), ref_ori, request)
}

/// Azimuth, elevation and composite angle of "to" relative to the line of sight of "from".
pub fn relative_az_el(
    from_lla: &Vec3,
    from_ori: &Vec3,
    to_lla: &Vec3,
    request: AngleRequest,
    model: EarthModel<'_>,
) -> Result<Angles> {
    const OPERATION: &str = "relative azimuth/elevation";
    if request.is_empty() {
        return Err(ConversionError::NoOutputRequested(OPERATION));
    }
    if let EarthModel::PerfectSphere = model {
        return Err(model.unsupported(OPERATION));
    }
    let los = line_of_sight(from_lla, to_lla, model, OPERATION)?;
    calculate_rel_ang(&los, from_ori, request)
}

/// True azimuth [0, 2π), elevation and angle off north from "from" to "to".
pub fn absolute_az_el(
    from_lla: &Vec3,
    to_lla: &Vec3,
    request: AngleRequest,
    model: EarthModel<'_>,
) -> Result<Angles> {
    const OPERATION: &str = "absolute azimuth/elevation";
    if request.is_empty() {
        return Err(ConversionError::NoOutputRequested(OPERATION));
    }
    let los = line_of_sight(from_lla, to_lla, model, OPERATION)?;

    Ok(Angles {
        azimuth: request.azimuth.then(|| ang_fix_2pi(los.x.atan2(los.y))),
        elevation: request.elevation.then(|| los.z.atan2(los.x.hypot(los.y))),
        composite: request
            .composite
            .then(|| v3_angle(&Vec3::new(0.0, 1.0, 0.0), &los)),
    })
}

/// Straight line distance between the two positions.
pub fn slant_distance(from_lla: &Vec3, to_lla: &Vec3, model: EarthModel<'_>) -> Result<f64> {
    match model {
        EarthModel::Wgs84 => Ok((geodetic_to_ecef(to_lla) - geodetic_to_ecef(from_lla)).norm()),
        EarthModel::PerfectSphere => {
            Ok((geodetic_to_spherical(to_lla) - geodetic_to_spherical(from_lla)).norm())
        }
        _ => {
            let (from, to) = local_pair(from_lla, to_lla, model, "slant distance")?;
            Ok((to - from).norm())
        }
    }
}

/// Distance between the two positions dropped to the surface; geodesic under WGS-84.
pub fn ground_distance(from_lla: &Vec3, to_lla: &Vec3, model: EarthModel<'_>) -> Result<f64> {
    match model {
        EarthModel::Wgs84 => Ok(sodano_distance(from_lla.x, from_lla.y, 0.0, to_lla.x, to_lla.y)),
        _ => {
            let (from, to) = local_pair(from_lla, to_lla, model, "ground distance")?;
            Ok((to.x - from.x).hypot(to.y - from.y))
        }
    }
}

/// Height of "to" above "from"; positive when "to" is higher.
pub fn altitude_delta(from_lla: &Vec3, to_lla: &Vec3, model: EarthModel<'_>) -> Result<f64> {
    match model {
        EarthModel::Wgs84 => Ok(to_lla.z - from_lla.z),
        _ => {
            let (from, to) = local_pair(from_lla, to_lla, model, "altitude delta")?;
            Ok(to.z - from.z)
        }
    }
}

/// Splits the slant range into components along and across `yaw` and below "from".
pub fn down_cross_down_value(
    from_lla: &Vec3,
    yaw: f64,
    to_lla: &Vec3,
    request: RangeRequest,
    model: EarthModel<'_>,
) -> Result<DownRangeValues> {
    if request.is_empty() {
        return Err(ConversionError::NoOutputRequested("down-range/cross-range"));
    }

    let slant = slant_distance(from_lla, to_lla, model)?;
    let angles = absolute_az_el(from_lla, to_lla, AngleRequest::AZIMUTH_ELEVATION, model)?;
    let azimuth = angles.azimuth.unwrap_or_default();
    let elevation = angles.elevation.unwrap_or_default();

    let off_heading = azimuth - yaw;
    let horizontal = slant * elevation.cos();
    Ok(DownRangeValues {
        down_range: request.down_range.then(|| horizontal * off_heading.cos()),
        cross_range: request.cross_range.then(|| horizontal * off_heading.sin()),
        down_value: request.down_value.then(|| slant * elevation.sin()),
    })
}

/// Expresses two full geodetic states in the model's common frame: ECEF for WGS-84,
/// X-East at "from" for the tangent plane, ENU for flat earth.
pub fn convert_locations(
    from_state: &Coordinate,
    to_state: &Coordinate,
    model: EarthModel<'_>,
) -> Result<(Coordinate, Coordinate)> {
    const OPERATION: &str = "convert locations";
    match model {
        EarthModel::Wgs84 => Ok((
            geodetic_coordinate_to_ecef(from_state, LocalLevelFrame::Ned)?,
            geodetic_coordinate_to_ecef(to_state, LocalLevelFrame::Ned)?,
        )),
        EarthModel::TangentPlaneWgs84 => {
            let converter = ReferenceFrameConverter::with_origin(&from_state.position);
            Ok((
                converter.convert(from_state, CoordinateSystem::XEast)?,
                converter.convert(to_state, CoordinateSystem::XEast)?,
            ))
        }
        EarthModel::FlatEarth(converter) => {
            let converter = flat_earth_converter(converter, OPERATION)?;
            Ok((
                converter.convert(from_state, CoordinateSystem::Enu)?,
                converter.convert(to_state, CoordinateSystem::Enu)?,
            ))
        }
        EarthModel::PerfectSphere => Err(model.unsupported(OPERATION)),
    }
}

fn moving_pair(
    from_lla: &Vec3,
    to_lla: &Vec3,
    from_vel: &Vec3,
    to_vel: &Vec3,
    model: EarthModel<'_>,
) -> Result<(Coordinate, Coordinate)> {
    convert_locations(
        &lla(from_lla).with_velocity(*from_vel),
        &lla(to_lla).with_velocity(*to_vel),
        model,
    )
}

/// Rate at which the two entities approach each other; negative when separating.
pub fn closing_velocity(
    from_lla: &Vec3,
    to_lla: &Vec3,
    from_vel: &Vec3,
    to_vel: &Vec3,
    model: EarthModel<'_>,
) -> Result<f64> {
    let (from, to) = moving_pair(from_lla, to_lla, from_vel, to_vel, model)?;
    let unit_los = (to.position - from.position)
        .try_normalize(0.0)
        .unwrap_or_else(Vec3::zeros);
    let relative = from.velocity.unwrap_or_else(Vec3::zeros) - to.velocity.unwrap_or_else(Vec3::zeros);
    Ok(relative.dot(&unit_los))
}

/// Magnitude of the velocity difference, always non-negative.
pub fn velocity_delta(
    from_lla: &Vec3,
    to_lla: &Vec3,
    from_vel: &Vec3,
    to_vel: &Vec3,
    model: EarthModel<'_>,
) -> Result<f64> {
    let (from, to) = moving_pair(from_lla, to_lla, from_vel, to_vel, model)?;
    Ok((from.velocity.unwrap_or_else(Vec3::zeros) - to.velocity.unwrap_or_else(Vec3::zeros)).norm())
}

fn relative_bearing(
    from_lla: &Vec3,
    from_ori: &Vec3,
    to_lla: &Vec3,
    model: EarthModel<'_>,
) -> Result<f64> {
    let angles = relative_az_el(from_lla, from_ori, to_lla, AngleRequest::AZIMUTH, model)?;
    Ok(angles.azimuth.unwrap_or_default())
}

/// Range rate (m/s) from the speed of each entity along the relative bearing.
#[allow(clippy::too_many_arguments)]
pub fn range_rate(
    from_lla: &Vec3,
    from_ori: &Vec3,
    to_lla: &Vec3,
    to_ori: &Vec3,
    from_vel: &Vec3,
    to_vel: &Vec3,
    model: EarthModel<'_>,
) -> Result<f64> {
    let bearing = relative_bearing(from_lla, from_ori, to_lla, model)?;
    Ok(from_vel.norm() * (from_ori.x - bearing).cos() - to_vel.norm() * (to_ori.x - bearing).cos())
}

/// Bearing rate (rad/s). Zero when the two positions share a ground point.
#[allow(clippy::too_many_arguments)]
pub fn bearing_rate(
    from_lla: &Vec3,
    from_ori: &Vec3,
    to_lla: &Vec3,
    to_ori: &Vec3,
    from_vel: &Vec3,
    to_vel: &Vec3,
    model: EarthModel<'_>,
) -> Result<f64> {
    let bearing = relative_bearing(from_lla, from_ori, to_lla, model)?;
    let range = ground_distance(from_lla, to_lla, model)?;
    if range == 0.0 {
        return Ok(0.0);
    }
    let to_speed = to_vel.norm();
    let from_speed = from_vel.norm();

    // the range divides only the cross-bearing product
    Ok((to_speed * to_ori.x.sin() - from_speed * from_ori.x.sin()) * bearing.cos()
        - (to_speed * to_ori.x.cos() - from_speed * from_ori.x.cos()) * bearing.sin() / range)
}

/// Angle between the longitudinal axis of "to" and the line of sight from "to" back to
/// "from". Zero when "to" points straight at "from".
pub fn aspect_angle(from_lla: &Vec3, to_lla: &Vec3, to_ori: &Vec3) -> f64 {
    let le = local_to_earth_matrix(to_lla.x, to_lla.y, LocalLevelFrame::Ned);
    let body_x = le.transpose() * body_unit_x(to_ori.x, to_ori.y);

    let los = (geodetic_to_ecef(to_lla) - geodetic_to_ecef(from_lla))
        .try_normalize(0.0)
        .unwrap_or_else(Vec3::zeros);
    inverse_cosine(-los.dot(&body_x))
}

/// Geocentric radius of the WGS-84 ellipsoid at `latitude`.
pub fn calculate_earth_radius(latitude: f64) -> f64 {
    let (s_lat, c_lat) = latitude.sin_cos();
    let num = (WGS_A2 * c_lat).powi(2) + (WGS_B2 * s_lat).powi(2);
    let den = (WGS_A * c_lat).powi(2) + (WGS_B * s_lat).powi(2);
    (num / den).sqrt()
}

/// Snaps an ECEF point onto the ellipsoid unless it is already within 5 mm of it.
pub fn clamp_ecef_to_surface(ecef: &Vec3) -> Vec3 {
    let mut lla = ecef_to_geodetic(ecef);
    if are_equal(lla.z, 0.0, 5.0e-3) {
        return *ecef;
    }
    lla.z = 0.0;
    geodetic_to_ecef(&lla)
}

/// Distance to the horizon from `lla`, zero at or below the surface.
///
/// Optical and radar horizons scale the earth radius by `optical_radius` and `rf_radius`
/// to account for refraction.
pub fn horizon_distance(lla: &Vec3, kind: HorizonKind, optical_radius: f64, rf_radius: f64) -> f64 {
    let alt = lla.z;
    if alt <= 0.0 {
        return 0.0;
    }
    let two_re = 2.0 * calculate_earth_radius(lla.x);
    let scalar = match kind {
        HorizonKind::Geometric => 1.0,
        HorizonKind::Optical => optical_radius,
        HorizonKind::Radar => rf_radius,
    };
    (two_re * alt * scalar + alt * alt).sqrt()
}

/// [`horizon_distance`] with the default refraction scalars.
pub fn default_horizon_distance(lla: &Vec3, kind: HorizonKind) -> f64 {
    horizon_distance(lla, kind, DEFAULT_OPTICAL_RADIUS, DEFAULT_RF_RADIUS)
}

/// Geodetic position to perfect sphere XYZ.
///
/// +X points at (0, -180), +Y at (0, -90) and +Z at the north pole.
pub fn geodetic_to_spherical(lla: &Vec3) -> Vec3 {
    let scale = EARTH_RADIUS + lla.z;
    let (s_lat, c_lat) = lla.x.sin_cos();
    Vec3::new(
        -c_lat * lla.y.cos() * scale,
        -c_lat * lla.y.sin() * scale,
        s_lat * scale,
    )
}

/// Perfect sphere XYZ to ENU on the plane tangent at `lla`. `sphere_origin` is the
/// spherical position of `lla`, when already known.
pub fn sphere_to_tangent_plane(lla: &Vec3, sphere: &Vec3, sphere_origin: Option<&Vec3>) -> Vec3 {
    let origin = sphere_origin
        .copied()
        .unwrap_or_else(|| geodetic_to_spherical(lla));
    let d = sphere - origin;
    // ENU of a plane at (0, 0), then rotated to the plane at (lat, lon)
    let tp = Vec3::new(-d.y, d.z, -d.x);
    v3_rot_x(&v3_rot_y(&tp, -lla.y), lla.x)
}

/// Inverse of [`sphere_to_tangent_plane`].
pub fn tangent_plane_to_sphere(lla: &Vec3, tp: &Vec3, sphere_origin: Option<&Vec3>) -> Vec3 {
    let at_zero = v3_rot_y(&v3_rot_x(tp, -lla.x), lla.y);
    let origin = sphere_origin
        .copied()
        .unwrap_or_else(|| geodetic_to_spherical(lla));
    Vec3::new(-at_zero.z, -at_zero.x, at_zero.y) + origin
}

/// Geodetic orientation of something oriented at `rel_ypr` relative to a host at `host_ypr`.
pub fn geodetic_ori_from_rel_ori(host_ypr: &Vec3, rel_ypr: &Vec3) -> Vec3 {
    dcm_to_euler(&(euler_to_dcm(rel_ypr) * euler_to_dcm(host_ypr)))
}

/// Geodetic position of a point offset from `lla` in a body frame oriented at `body_ori`.
///
/// The offset is forward, left, up (meters).
pub fn geodetic_offset_position(lla: &Vec3, body_ori: &Vec3, body_offset: &Vec3) -> Vec3 {
    let frd = Vec3::new(body_offset.x, -body_offset.y, -body_offset.z);
    let ned = euler_to_dcm(body_ori).transpose() * frd;
    let le = local_to_earth_matrix(lla.x, lla.y, LocalLevelFrame::Ned);
    ecef_to_geodetic(&(geodetic_to_ecef(lla) + le.transpose() * ned))
}

/// Geodetic position `range` meters from `lla` along true azimuth `az` and elevation `el`.
pub fn geodetic_end_point(lla: &Vec3, az: f64, el: f64, range: f64) -> Vec3 {
    if are_equal(range, 0.0, DEFAULT_TOLERANCE) {
        return *lla;
    }
    geodetic_offset_position(lla, &Vec3::new(az, el, 0.0), &Vec3::new(range, 0.0, 0.0))
}

/// Closest point to `to_lla` on the segment from `start_lla` to `end_lla`, measured in a
/// tangent plane at the start. Returns the distance and the geodetic closest point.
pub fn closest_point(start_lla: &Vec3, end_lla: &Vec3, to_lla: &Vec3) -> Result<(f64, Vec3)> {
    let converter = ReferenceFrameConverter::with_origin(start_lla);
    let segment = local_position(&converter, end_lla, CoordinateSystem::XEast)?;
    let target = local_position(&converter, to_lla, CoordinateSystem::XEast)?;

    let segment_length = segment.norm();
    if are_equal(segment_length, 0.0, DEFAULT_TOLERANCE) {
        return Ok((0.0, *start_lla));
    }

    let angle = v3_angle(&segment, &target);
    let along = if angle > std::f64::consts::FRAC_PI_2 {
        0.0
    } else {
        (target.norm() * angle.cos()).min(segment_length)
    };

    let closest = segment * (along / segment_length);
    let closest_lla = converter
        .convert(
            &Coordinate::new(CoordinateSystem::XEast, closest),
            CoordinateSystem::Lla,
        )?
        .position;
    Ok(((target - closest).norm(), closest_lla))
}
