use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use geoframe::calculations::{
    absolute_az_el, altitude_delta, aspect_angle, bearing_rate, closing_velocity,
    down_cross_down_value, ground_distance, horizon_distance, range_rate, relative_az_el,
    slant_distance, velocity_delta, HorizonKind,
};
use geoframe::config::Config;
use geoframe::drcr::calculate_geodesic_drcr;
use geoframe::geodesics::{geodetic_midpoint, sodano_direct, sodano_inverse};
use geoframe::{AngleRequest, CoordinateSystem, RangeRequest};

#[derive(Parser)]
#[command(name = "geoframe", version, about = "Geodetic frame conversions and relative geometry")]
struct Cli {
    /// Scenario file (defaults to ./geoframe.toml, then the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert the [from] platform into another coordinate system
    Convert {
        #[arg(long)]
        system: CoordinateSystem,
    },
    /// Relative geometry between [from] and [to]
    Relative,
    /// Geodesic down-range and cross-range of [to] along the heading of [from]
    Drcr,
    /// Horizon distances from [from]
    Horizon,
    /// Travel a geodesic from [from] and measure the way back
    Geodesic {
        /// Meters
        #[arg(long)]
        distance: f64,
        /// Degrees clockwise from north
        #[arg(long)]
        azimuth: f64,
    },
}

fn config_path(cli_path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = cli_path {
        return Ok(path);
    }
    let local = PathBuf::from("geoframe.toml");
    if local.exists() {
        return Ok(local);
    }
    let fallback = dirs::config_dir()
        .map(|dir| dir.join("geoframe").join("config.toml"))
        .ok_or_else(|| anyhow!("no geoframe.toml found and no user config directory"))?;
    Ok(fallback)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let path = config_path(cli.config)?;
    let config = Config::load(&path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(path = %path.display(), "loaded scenario");

    match cli.command {
        Command::Convert { system } => convert(&config, system),
        Command::Relative => relative(&config),
        Command::Drcr => drcr(&config),
        Command::Horizon => horizon(&config),
        Command::Geodesic { distance, azimuth } => geodesic(&config, distance, azimuth),
    }
}

fn convert(config: &Config, system: CoordinateSystem) -> Result<()> {
    let converter = config.converter();
    let elapsed = config.time.elapsed_eci_time()?;
    let input = config.from.to_coordinate().with_elapsed_eci_time(elapsed);

    let output = converter
        .convert(&input, system)
        .with_context(|| format!("converting {} to {}", config.from.name, system))?;
    println!("{}", config.from.name);
    println!("  {}", input);
    println!("  {}", output);
    Ok(())
}

fn print_value(label: &str, value: geoframe::Result<f64>, unit: &str) {
    match value {
        Ok(v) => println!("  {:<22} {:>14.3} {}", label, v, unit),
        Err(e) => println!("  {:<22} {:>14} ({})", label, "n/a", e),
    }
}

fn print_angle(label: &str, value: Option<f64>) {
    if let Some(v) = value {
        println!("  {:<22} {:>14.4} °", label, v.to_degrees());
    }
}

fn relative(config: &Config) -> Result<()> {
    let converter = config.converter();
    let model = config.calculation.earth_model.bind(&converter)?;
    let (from, to) = (&config.from, &config.to);
    let (from_lla, to_lla) = (from.lla(), to.lla());
    let (from_ori, to_ori) = (from.orientation(), to.orientation());
    let (from_vel, to_vel) = (from.velocity(), to.velocity());

    println!("{} -> {} ({})", from.name, to.name, model);

    print_value("slant distance", slant_distance(&from_lla, &to_lla, model), "m");
    print_value("ground distance", ground_distance(&from_lla, &to_lla, model), "m");
    print_value("altitude delta", altitude_delta(&from_lla, &to_lla, model), "m");

    match absolute_az_el(&from_lla, &to_lla, AngleRequest::ALL, model) {
        Ok(angles) => {
            print_angle("true azimuth", angles.azimuth);
            print_angle("true elevation", angles.elevation);
            print_angle("angle off north", angles.composite);
        }
        Err(e) => println!("  true azimuth/elevation unavailable: {}", e),
    }
    match relative_az_el(&from_lla, &from_ori, &to_lla, AngleRequest::ALL, model) {
        Ok(angles) => {
            print_angle("relative azimuth", angles.azimuth);
            print_angle("relative elevation", angles.elevation);
            print_angle("composite angle", angles.composite);
        }
        Err(e) => println!("  relative azimuth/elevation unavailable: {}", e),
    }
    print_angle("aspect angle", Some(aspect_angle(&from_lla, &to_lla, &to_ori)));

    match down_cross_down_value(&from_lla, from_ori.x, &to_lla, RangeRequest::ALL, model) {
        Ok(values) => {
            print_value("down range", Ok(values.down_range.unwrap_or_default()), "m");
            print_value("cross range", Ok(values.cross_range.unwrap_or_default()), "m");
            print_value("down value", Ok(values.down_value.unwrap_or_default()), "m");
        }
        Err(e) => println!("  down/cross range unavailable: {}", e),
    }

    print_value(
        "closing velocity",
        closing_velocity(&from_lla, &to_lla, &from_vel, &to_vel, model),
        "m/s",
    );
    print_value(
        "velocity delta",
        velocity_delta(&from_lla, &to_lla, &from_vel, &to_vel, model),
        "m/s",
    );
    print_value(
        "range rate",
        range_rate(&from_lla, &from_ori, &to_lla, &to_ori, &from_vel, &to_vel, model),
        "m/s",
    );
    print_value(
        "bearing rate",
        bearing_rate(&from_lla, &from_ori, &to_lla, &to_ori, &from_vel, &to_vel, model)
            .map(f64::to_degrees),
        "°/s",
    );

    let (midpoint, wraps) = geodetic_midpoint(&from_lla, &to_lla, true);
    println!(
        "  {:<22} {:>.6}° {:.6}°{}",
        "geodesic midpoint",
        midpoint.x.to_degrees(),
        midpoint.y.to_degrees(),
        if wraps { " (crosses dateline)" } else { "" }
    );

    if let Some(gate) = config.gate() {
        let inside = gate.contains(&from_lla, &to_lla, model)?;
        println!("  {:<22} {:>14}", "in gate", if inside { "yes" } else { "no" });
        if let Some(laser) = config.laser() {
            let points = config.calculation.laser_points;
            let inside = gate.contains_laser(&from_lla, &to_lla, &laser, model, points)?;
            println!("  {:<22} {:>14}", "laser in gate", if inside { "yes" } else { "no" });
        }
    }
    Ok(())
}

fn drcr(config: &Config) -> Result<()> {
    let (from, to) = (&config.from, &config.to);
    let result = calculate_geodesic_drcr(
        &from.lla(),
        from.orientation().x,
        &to.lla(),
        config.calculation.min_down_range,
        config.calculation.min_cross_range,
    );
    if !matches!(result.status, geoframe::NumericalSearchType::Converged) {
        tracing::warn!(status = ?result.status, "geodesic search did not converge");
    }

    println!("{} -> {} along {:.3}°", from.name, to.name, from.yaw);
    println!("  {:<22} {:>14.3} m", "down range", result.down_range);
    println!("  {:<22} {:>14.3} m", "cross range", result.cross_range);
    println!("  {:<22} {:>14?}", "status", result.status);
    Ok(())
}

fn horizon(config: &Config) -> Result<()> {
    let lla = config.from.lla();
    let calc = &config.calculation;
    println!("{} at {:.1} m", config.from.name, config.from.altitude);
    for (label, kind) in [
        ("geometric", HorizonKind::Geometric),
        ("optical", HorizonKind::Optical),
        ("radar", HorizonKind::Radar),
    ] {
        let distance = horizon_distance(&lla, kind, calc.optical_radius, calc.rf_radius);
        println!("  {:<22} {:>14.3} km", label, distance / 1000.0);
    }
    Ok(())
}

fn geodesic(config: &Config, distance: f64, azimuth: f64) -> Result<()> {
    let lla = config.from.lla();
    let end = sodano_direct(lla.x, lla.y, lla.z, distance, azimuth.to_radians());
    let back = sodano_inverse(lla.x, lla.y, lla.z, end.lat, end.lon, true, true);

    println!("{} {:.1} m along {:.3}°", config.from.name, distance, azimuth);
    println!(
        "  {:<22} {:>.8}° {:.8}°",
        "end point",
        end.lat.to_degrees(),
        end.lon.to_degrees()
    );
    println!("  {:<22} {:>14.4} °", "back azimuth", end.back_azimuth.to_degrees());
    println!("  {:<22} {:>14.3} m", "inverse distance", back.distance);
    if let Some(az) = back.forward_azimuth {
        println!("  {:<22} {:>14.4} °", "inverse azimuth", az.to_degrees());
    }
    Ok(())
}
