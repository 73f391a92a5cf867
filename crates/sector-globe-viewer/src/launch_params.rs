//! Launch parameter parsing for the viewer.
//!
//! On native, parameters are parsed from command-line arguments using clap.
//! On WASM, defaults are used.

use std::path::PathBuf;

use bevy::prelude::*;

/// Default endpoint polled for externally driven selections.
pub const DEFAULT_SELECTION_URL: &str = "http://localhost:3001/selected.json";
/// Default seconds between external selection polls.
const DEFAULT_POLL_INTERVAL: f32 = 2.0;
/// Default starting camera distance, in globe radii.
const DEFAULT_DISTANCE: f64 = 2.75;

/// Launch parameters for the viewer.
#[derive(Resource, Debug, Clone)]
pub struct LaunchParams {
    /// Dataset JSON file. The built-in dataset is used when absent.
    pub dataset: Option<PathBuf>,
    /// Endpoint for external selections, or `None` to disable polling.
    pub selection_url: Option<String>,
    /// Seconds between external selection polls.
    pub poll_interval: f32,
    /// Font file for label and panel text.
    pub font: Option<PathBuf>,
    /// Starting camera distance in globe radii.
    pub distance: f64,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            dataset: None,
            selection_url: Some(DEFAULT_SELECTION_URL.to_owned()),
            poll_interval: DEFAULT_POLL_INTERVAL,
            font: None,
            distance: DEFAULT_DISTANCE,
        }
    }
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use clap::Parser;

    use super::*;

    fn parse_positive(s: &str) -> Result<f32, String> {
        let value: f32 = s.parse().map_err(|e| format!("invalid number: {e}"))?;
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(format!("expected a positive number, got {value}"))
        }
    }

    #[derive(Parser)]
    #[command(about = "Interactive sector globe viewer")]
    struct CliArgs {
        /// Dataset JSON file (defaults to the built-in dataset).
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Endpoint polled for external selections.
        #[arg(long, default_value = DEFAULT_SELECTION_URL)]
        selection_url: String,

        /// Disable external selection polling.
        #[arg(long)]
        no_poll: bool,

        /// Seconds between external selection polls.
        #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL, value_parser = parse_positive)]
        poll_interval: f32,

        /// Font file with glyphs for the dataset's labels (TTF/OTF).
        #[arg(long)]
        font: Option<PathBuf>,

        /// Starting camera distance in globe radii.
        #[arg(long, default_value_t = DEFAULT_DISTANCE)]
        distance: f64,
    }

    pub fn parse() -> LaunchParams {
        let args = CliArgs::parse();
        LaunchParams {
            dataset: args.dataset,
            selection_url: (!args.no_poll).then_some(args.selection_url),
            poll_interval: args.poll_interval,
            font: args.font,
            distance: args.distance,
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_positive() {
            assert_eq!(parse_positive("2.5"), Ok(2.5));
            assert!(parse_positive("0").is_err());
            assert!(parse_positive("-1").is_err());
            assert!(parse_positive("soon").is_err());
        }

        #[test]
        fn test_cli_defaults_and_flags() {
            let args = CliArgs::parse_from(["viewer"]);
            assert_eq!(args.selection_url, DEFAULT_SELECTION_URL);
            assert!(!args.no_poll);
            assert!(args.dataset.is_none());

            let args = CliArgs::parse_from(["viewer", "--no-poll", "--distance", "4", "--dataset", "d.json"]);
            assert!(args.no_poll);
            assert_eq!(args.distance, 4.0);
            assert_eq!(args.dataset, Some(PathBuf::from("d.json")));
        }
    }
}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> LaunchParams {
    #[cfg(not(target_family = "wasm"))]
    {
        native::parse()
    }
    #[cfg(target_family = "wasm")]
    {
        LaunchParams::default()
    }
}
