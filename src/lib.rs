//! Geodetic reference frames and the relative geometry between two entities on or above
//! the WGS-84 ellipsoid.
//!
//! Positions move between frames through [`ReferenceFrameConverter`]. Angles, ranges and
//! rates between a "from" and a "to" entity live in [`calculations`], evaluated under an
//! [`EarthModel`]. Ellipsoidal geodesics and the down-range/cross-range solver built on them
//! live in [`geodesics`] and [`drcr`].

pub mod calculations;
pub mod config;
pub mod constants;
pub mod converter;
pub mod coordinate;
pub mod drcr;
pub mod eci;
pub mod error;
pub mod gate;
pub mod geodesics;
pub mod kinematics;
pub mod math;
pub mod platform;
pub mod search;

pub use calculations::{AngleRequest, Angles, DownRangeValues, EarthModel, EarthModelKind, RangeRequest};
pub use converter::{LocalLevelFrame, ReferenceFrameConverter, ReferenceOriginStatus};
pub use coordinate::{Coordinate, CoordinateSystem, Vec3};
pub use error::{ConversionError, Result};
pub use search::NumericalSearchType;
