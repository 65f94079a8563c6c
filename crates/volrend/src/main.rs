//! volrend viewer and batch renderer.
//!
//! ```text
//! volrend [--config <file.json>] [output.png [width [height]]]
//! ```
//!
//! Without an output path the interactive viewer opens; with one, a single
//! headless frame is written.

use std::path::PathBuf;
use std::process::ExitCode;

use volrend::{Result, Scene, ViewerConfig, VolrendError};

const USAGE: &str = "usage: volrend [--config <file.json>] [output.png [width [height]]]";

struct Args {
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args {
        config: None,
        output: None,
        width: None,
        height: None,
    };
    let mut positional = Vec::new();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let path = iter.next().ok_or_else(|| {
                VolrendError::InvalidArgument("--config needs a file path".to_string())
            })?;
            parsed.config = Some(PathBuf::from(path));
        } else {
            positional.push(arg);
        }
    }

    let parse_size = |s: &String| {
        s.parse::<u32>()
            .map_err(|e| VolrendError::InvalidArgument(format!("invalid size '{s}': {e}")))
    };
    parsed.output = positional.first().map(PathBuf::from);
    parsed.width = positional.get(1).map(parse_size).transpose()?;
    parsed.height = positional.get(2).map(parse_size).transpose()?;
    Ok(parsed)
}

fn run() -> Result<()> {
    volrend::init_logging();
    let args = parse_args(std::env::args().skip(1))?;

    let mut config = match &args.config {
        Some(path) => ViewerConfig::from_json_file(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(width) = args.width {
        config.window_width = width;
    }
    if let Some(height) = args.height {
        config.window_height = height;
    }

    let mut scene = Scene::from_config(&config)?;
    match args.output {
        Some(output) => volrend::render_to_file(
            &mut scene,
            &output,
            config.window_width,
            config.window_height,
        ),
        None => volrend::show(config, scene),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            if matches!(err, VolrendError::InvalidArgument(_)) {
                eprintln!("{USAGE}");
            }
            ExitCode::FAILURE
        }
    }
}
