use nalgebra::Vector3;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Three doubles; units depend on which field of a [`Coordinate`] holds it.
pub type Vec3 = Vector3<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoordinateSystem {
    /// Geodetic latitude, longitude (radians) and altitude (meters)
    Lla,
    Ecef,
    Eci,
    /// Tangent plane at the reference origin, x pointing east
    XEast,
    Enu,
    Ned,
    Nwu,
    /// Generic tangent plane; carried for completeness, never converted
    Gtp,
}

impl CoordinateSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinateSystem::Lla => "LLA",
            CoordinateSystem::Ecef => "ECEF",
            CoordinateSystem::Eci => "ECI",
            CoordinateSystem::XEast => "XEAST",
            CoordinateSystem::Enu => "ENU",
            CoordinateSystem::Ned => "NED",
            CoordinateSystem::Nwu => "NWU",
            CoordinateSystem::Gtp => "GTP",
        }
    }

    /// True for the scaled flat earth systems
    pub fn is_flat_earth(&self) -> bool {
        matches!(
            self,
            CoordinateSystem::Enu | CoordinateSystem::Ned | CoordinateSystem::Nwu
        )
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordinateSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "lla" | "geodetic" => Ok(CoordinateSystem::Lla),
            "ecef" => Ok(CoordinateSystem::Ecef),
            "eci" => Ok(CoordinateSystem::Eci),
            "x-east" | "xeast" => Ok(CoordinateSystem::XEast),
            "enu" => Ok(CoordinateSystem::Enu),
            "ned" => Ok(CoordinateSystem::Ned),
            "nwu" => Ok(CoordinateSystem::Nwu),
            "gtp" => Ok(CoordinateSystem::Gtp),
            other => Err(format!("unknown coordinate system '{}'", other)),
        }
    }
}

/// A position in some coordinate system, with optional orientation (yaw, pitch, roll),
/// velocity and acceleration.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    pub system: CoordinateSystem,
    pub position: Vec3,
    pub orientation: Option<Vec3>,
    pub velocity: Option<Vec3>,
    pub acceleration: Option<Vec3>,
    /// Seconds since the caller's ECI epoch; only meaningful for ECI
    pub elapsed_eci_time: f64,
}

impl Coordinate {
    pub fn new(system: CoordinateSystem, position: Vec3) -> Self {
        Self {
            system,
            position,
            orientation: None,
            velocity: None,
            acceleration: None,
            elapsed_eci_time: 0.0,
        }
    }

    pub fn lla(lat: f64, lon: f64, alt: f64) -> Self {
        Self::new(CoordinateSystem::Lla, Vec3::new(lat, lon, alt))
    }

    pub fn with_orientation(mut self, orientation: Vec3) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_acceleration(mut self, acceleration: Vec3) -> Self {
        self.acceleration = Some(acceleration);
        self
    }

    pub fn with_elapsed_eci_time(mut self, elapsed: f64) -> Self {
        self.elapsed_eci_time = elapsed;
        self
    }

    /// An empty coordinate in `system` carrying over the elapsed ECI time of `self`.
    pub(crate) fn blank_as(&self, system: CoordinateSystem) -> Self {
        Self::new(system, Vec3::zeros()).with_elapsed_eci_time(self.elapsed_eci_time)
    }

    /// Applies `f` to position, velocity and acceleration, keeping orientation.
    pub(crate) fn map_vectors<F>(&self, system: CoordinateSystem, f: F) -> Self
    where
        F: Fn(&Vec3) -> Vec3,
    {
        Self {
            system,
            position: f(&self.position),
            orientation: self.orientation,
            velocity: self.velocity.as_ref().map(&f),
            acceleration: self.acceleration.as_ref().map(&f),
            elapsed_eci_time: self.elapsed_eci_time,
        }
    }

    pub fn lat(&self) -> f64 {
        self.position.x
    }

    pub fn lon(&self) -> f64 {
        self.position.y
    }

    pub fn alt(&self) -> f64 {
        self.position.z
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.system == CoordinateSystem::Lla {
            write!(
                f,
                "{} pos: {:.8}° {:.8}° {:.3}m",
                self.system,
                self.position.x.to_degrees(),
                self.position.y.to_degrees(),
                self.position.z
            )?;
        } else {
            write!(
                f,
                "{} pos: {:.3} {:.3} {:.3}",
                self.system, self.position.x, self.position.y, self.position.z
            )?;
        }
        if let Some(ori) = &self.orientation {
            write!(
                f,
                "  ori: {:.4}° {:.4}° {:.4}°",
                ori.x.to_degrees(),
                ori.y.to_degrees(),
                ori.z.to_degrees()
            )?;
        }
        if let Some(vel) = &self.velocity {
            write!(f, "  vel: {:.3} {:.3} {:.3}", vel.x, vel.y, vel.z)?;
        }
        if let Some(acc) = &self.acceleration {
            write!(f, "  acc: {:.3} {:.3} {:.3}", acc.x, acc.y, acc.z)?;
        }
        if self.system == CoordinateSystem::Eci {
            write!(f, "  t: {:.3}s", self.elapsed_eci_time)?;
        }
        Ok(())
    }
}
