use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;

use crate::calculations::EarthModelKind;
use crate::constants::{DEFAULT_OPTICAL_RADIUS, DEFAULT_RF_RADIUS};
use crate::converter::ReferenceFrameConverter;
use crate::drcr::{DEFAULT_MIN_CROSS_RANGE, DEFAULT_MIN_DOWN_RANGE};
use crate::eci::EciEpoch;
use crate::gate::{Gate, Laser};
use crate::platform::Platform;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reference: ReferenceConfig,
    pub from: Platform,
    pub to: Platform,
    #[serde(default)]
    pub calculation: CalculationConfig,
    #[serde(default)]
    pub time: TimeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub gate: Option<GateConfig>,
    pub laser: Option<LaserConfig>,
}

/// Flat earth reference origin. Without a latitude and longitude the origin sits under
/// the `[from]` platform.
#[derive(Debug, Default, Deserialize)]
pub struct ReferenceConfig {
    pub latitude: Option<f64>,  // degrees
    pub longitude: Option<f64>, // degrees
    #[serde(default)]
    pub altitude: f64,
    #[serde(default)]
    pub x_offset: f64, // meters east
    #[serde(default)]
    pub y_offset: f64, // meters north
    #[serde(default)]
    pub rotation: f64, // degrees
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CalculationConfig {
    pub earth_model: EarthModelKind,
    pub optical_radius: f64,
    pub rf_radius: f64,
    pub min_down_range: f64,
    pub min_cross_range: f64,
    pub laser_points: usize,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            earth_model: EarthModelKind::Wgs84,
            optical_radius: DEFAULT_OPTICAL_RADIUS,
            rf_radius: DEFAULT_RF_RADIUS,
            min_down_range: DEFAULT_MIN_DOWN_RANGE,
            min_cross_range: DEFAULT_MIN_CROSS_RANGE,
            laser_points: 10,
        }
    }
}

/// RFC 3339 instants. Both absent means the ECI and ECEF frames coincide.
#[derive(Debug, Default, Deserialize)]
pub struct TimeConfig {
    pub eci_epoch: Option<String>,
    pub at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Gate around the `[from]` platform, angles in degrees.
#[derive(Debug, Deserialize)]
pub struct GateConfig {
    pub azimuth: f64,
    pub elevation: f64,
    pub width: f64,
    pub height: f64,
    pub min_range: f64,
    pub max_range: f64,
}

/// Laser carried by the `[to]` platform, angles in degrees.
#[derive(Debug, Deserialize)]
pub struct LaserConfig {
    pub azimuth: f64,
    pub elevation: f64,
    pub range: f64,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// Converter centred on the configured reference origin, with any tangent plane
    /// offsets applied.
    pub fn converter(&self) -> ReferenceFrameConverter {
        let reference = &self.reference;
        let mut converter = ReferenceFrameConverter::new();
        converter.set_reference_origin_degrees(
            reference.latitude.unwrap_or(self.from.latitude),
            reference.longitude.unwrap_or(self.from.longitude),
            reference.altitude,
        );
        converter.set_tangent_plane_offsets(
            reference.x_offset,
            reference.y_offset,
            reference.rotation.to_radians(),
        );
        converter
    }

    pub fn gate(&self) -> Option<Gate> {
        self.gate.as_ref().map(|g| Gate {
            azimuth: g.azimuth.to_radians(),
            elevation: g.elevation.to_radians(),
            width: g.width.to_radians(),
            height: g.height.to_radians(),
            min_range: g.min_range,
            max_range: g.max_range,
        })
    }

    pub fn laser(&self) -> Option<Laser> {
        self.laser.as_ref().map(|l| Laser {
            azimuth: l.azimuth.to_radians(),
            elevation: l.elevation.to_radians(),
            range: l.range,
        })
    }
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    let time = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("invalid RFC 3339 time '{}'", value))?;
    Ok(time.with_timezone(&Utc))
}

impl TimeConfig {
    /// Seconds from the ECI epoch to the evaluation instant; zero when either is missing.
    pub fn elapsed_eci_time(&self) -> Result<f64> {
        match (&self.eci_epoch, &self.at) {
            (Some(epoch), Some(at)) => {
                let epoch = EciEpoch::new(parse_time(epoch)?);
                Ok(epoch.elapsed_seconds(parse_time(at)?))
            }
            (Some(epoch), None) => {
                let epoch = EciEpoch::new(parse_time(epoch)?);
                Ok(epoch.elapsed_seconds(Utc::now()))
            }
            _ => Ok(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const MINIMAL: &str = r#"
        [from]
        name = "ship"
        latitude = 22.0
        longitude = -160.0
        altitude = 9.0

        [to]
        name = "target"
        latitude = 22.1
        longitude = -159.9
        altitude = 3000.0
        yaw = 270.0
        velocity = [-200.0, 0.0, 0.0]
    "#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::parse(MINIMAL).unwrap();
        assert_eq!(config.from.name, "ship");
        assert_eq!(config.to.velocity, [-200.0, 0.0, 0.0]);
        assert_eq!(config.to.pitch, 0.0);
        assert_eq!(config.calculation.earth_model, EarthModelKind::Wgs84);
        assert_relative_eq!(config.calculation.rf_radius, 4.0 / 3.0);
        assert_eq!(config.calculation.min_down_range, 0.0005);
        assert_eq!(config.logging.level, "info");
        assert!(config.gate().is_none());
        assert!(config.laser().is_none());
        assert_eq!(config.time.elapsed_eci_time().unwrap(), 0.0);

        // origin defaults to the from platform
        let converter = config.converter();
        assert_relative_eq!(converter.reference_origin().x, 22f64.to_radians());
        assert_relative_eq!(converter.reference_origin().y, (-160f64).to_radians());
    }

    #[test]
    fn full_config() {
        let contents = format!(
            "{}{}",
            MINIMAL,
            r#"
            [reference]
            latitude = 21.5
            longitude = -160.5
            altitude = 4.0

            [calculation]
            earth_model = "flat-earth"
            optical_radius = 1.1
            laser_points = 25

            [time]
            eci_epoch = "2024-01-01T00:00:00Z"
            at = "2024-01-01T00:01:30.250Z"

            [logging]
            level = "debug"

            [gate]
            azimuth = 45.0
            elevation = 10.0
            width = 20.0
            height = 5.0
            min_range = 100.0
            max_range = 90000.0

            [laser]
            azimuth = 30.0
            elevation = -2.0
            range = 5000.0
            "#
        );
        let config = Config::parse(&contents).unwrap();
        assert_eq!(config.calculation.earth_model, EarthModelKind::FlatEarth);
        assert_eq!(config.calculation.optical_radius, 1.1);
        assert_eq!(config.calculation.laser_points, 25);
        assert_relative_eq!(config.calculation.rf_radius, 4.0 / 3.0);
        assert_eq!(config.logging.level, "debug");
        assert_relative_eq!(config.time.elapsed_eci_time().unwrap(), 90.25);
        assert_relative_eq!(config.gate().unwrap().width, 20f64.to_radians());
        let laser = config.laser().unwrap();
        assert_relative_eq!(laser.elevation, (-2f64).to_radians());
        assert_eq!(laser.range, 5000.0);

        let converter = config.converter();
        assert_relative_eq!(converter.reference_origin().x, 21.5f64.to_radians());
        assert_eq!(converter.reference_origin().z, 4.0);
        assert!(config.calculation.earth_model.bind(&converter).is_ok());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Config::parse("[from]\nname = \"only\"").is_err());

        let bad_model = format!("{}\n[calculation]\nearth_model = \"hollow\"\n", MINIMAL);
        assert!(Config::parse(&bad_model).is_err());

        let bad_time = TimeConfig {
            eci_epoch: Some("yesterday".to_string()),
            at: None,
        };
        assert!(bad_time.elapsed_eci_time().is_err());
    }
}
