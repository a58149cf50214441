/// Panorama Terminal Demo - Rotating menu background cube
///
/// Usage: panorama-terminal [--look-at] [--yaw-multiplier <f32>] [--cube-size <f32>]
/// Controls:
///   - Mouse X: Field of view (orthographic-skew camera)
///   - Q/ESC: Quit

use panorama_core::CameraModel;
use panorama_terminal::{default_config, TerminalApp};
use std::env;
use std::io;

fn parse_value(flag: &str, value: Option<String>) -> io::Result<f32> {
    let value = value.ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("{} expects a value", flag))
    })?;
    value.parse().map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("Invalid value for {}: {}", flag, e))
    })
}

fn main() -> io::Result<()> {
    env_logger::init();

    let mut camera = CameraModel::OrthographicSkew;
    let mut yaw_multiplier = None;
    let mut cube_size = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--look-at" => camera = CameraModel::LookAt,
            "--yaw-multiplier" => yaw_multiplier = Some(parse_value(&arg, args.next())?),
            "--cube-size" => cube_size = Some(parse_value(&arg, args.next())?),
            other => {
                eprintln!("Usage: panorama-terminal [--look-at] [--yaw-multiplier <f32>] [--cube-size <f32>]");
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Unknown argument: {}", other),
                ));
            }
        }
    }

    let mut config = default_config(camera)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    if let Some(multiplier) = yaw_multiplier {
        config.animation.yaw_rate_multiplier = multiplier;
    }
    if let Some(size) = cube_size {
        config = config.with_cube_size(size);
    }
    log::info!("Starting panorama with {:?} camera", camera);

    let mut app = TerminalApp::new(config)?;
    app.run()?;

    println!("Thank you for using the panorama terminal demo!");
    Ok(())
}
