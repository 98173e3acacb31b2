//! Turning command-line flags into a validated [`Recipe`].
//!
//! A `--recipe` file is the base; explicit flags override its fields and
//! `--resize` entries are appended to its schedule.

use clap::Args;
use plexus_core::{Recipe, ScheduledResize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CliError;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;
pub const DEFAULT_FRAMES: u64 = 120;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Initial surface width in pixels [default: 800].
    #[arg(short = 'W', long)]
    pub width: Option<u32>,

    /// Initial surface height in pixels [default: 600].
    #[arg(short = 'H', long)]
    pub height: Option<u32>,

    /// Number of frames to run [default: 120].
    #[arg(short, long)]
    pub frames: Option<u64>,

    /// PRNG seed for deterministic output [default: 42].
    #[arg(long)]
    pub seed: Option<u64>,

    /// Backdrop parameters as a JSON string.
    #[arg(long, conflicts_with = "params_file")]
    pub params: Option<String>,

    /// Read backdrop parameters from a JSON file.
    #[arg(long)]
    pub params_file: Option<PathBuf>,

    /// Resize before a frame, as WIDTHxHEIGHT@FRAME (repeatable).
    #[arg(long = "resize", value_name = "WxH@FRAME")]
    pub resizes: Vec<ScheduledResize>,

    /// Start from a recipe JSON file; other flags override its fields.
    #[arg(long)]
    pub recipe: Option<PathBuf>,
}

fn read_to_string(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|e| CliError::Io(format!("{}: {e}", path.display())))
}

fn parse_params(text: &str, origin: &str) -> Result<Value, CliError> {
    let params: Value = serde_json::from_str(text)
        .map_err(|e| CliError::Input(format!("invalid {origin} JSON: {e}")))?;
    if !params.is_object() {
        return Err(CliError::Input(format!("{origin} must be a JSON object")));
    }
    Ok(params)
}

impl RunArgs {
    pub fn recipe(&self) -> Result<Recipe, CliError> {
        let mut recipe = match &self.recipe {
            Some(path) => serde_json::from_str(&read_to_string(path)?).map_err(|e| {
                CliError::Input(format!("invalid recipe {}: {e}", path.display()))
            })?,
            None => {
                let mut r = Recipe::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_SEED);
                r.frames = DEFAULT_FRAMES;
                r
            }
        };

        if let Some(w) = self.width {
            recipe.width = w;
        }
        if let Some(h) = self.height {
            recipe.height = h;
        }
        if let Some(f) = self.frames {
            recipe.frames = f;
        }
        if let Some(s) = self.seed {
            recipe.seed = s;
        }
        if let Some(text) = &self.params {
            recipe.params = parse_params(text, "--params")?;
        }
        if let Some(path) = &self.params_file {
            recipe.params = parse_params(&read_to_string(path)?, &path.display().to_string())?;
        }
        recipe.resizes.extend(self.resizes.iter().copied());

        recipe.validate()?;
        Ok(recipe)
    }
}

/// Checks that a rasterizing run has something to write.
///
/// At least one frame must run, and with `final_frame` the surface left by
/// the last scheduled resize must be non-empty.
pub fn ensure_drawable(recipe: &Recipe, final_frame: bool) -> Result<(), CliError> {
    if recipe.frames == 0 {
        return Err(CliError::Input("--frames must be at least 1".into()));
    }
    if final_frame {
        let (width, height) = recipe.final_size();
        if width == 0 || height == 0 {
            return Err(CliError::Input(format!(
                "final frame would be empty ({width}x{height})"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_without_flags() {
        let r = RunArgs::default().recipe().unwrap();
        assert_eq!((r.width, r.height), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
        assert_eq!(r.frames, DEFAULT_FRAMES);
        assert_eq!(r.seed, DEFAULT_SEED);
        assert_eq!(r.params, json!({}));
    }

    #[test]
    fn flags_override_recipe_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipe.json");
        fs::write(
            &path,
            r#"{"width": 300, "height": 200, "seed": 5, "frames": 10,
                "params": {"line_width": 2}, "resizes": [{"frame": 3, "width": 100, "height": 100}]}"#,
        )
        .unwrap();

        let args = RunArgs {
            seed: Some(9),
            recipe: Some(path),
            resizes: vec!["50x50@8".parse().unwrap()],
            ..RunArgs::default()
        };
        let r = args.recipe().unwrap();
        assert_eq!((r.width, r.height, r.frames), (300, 200, 10));
        assert_eq!(r.seed, 9);
        assert_eq!(r.params, json!({"line_width": 2}));
        assert_eq!(r.resizes.len(), 2);
    }

    #[test]
    fn params_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        fs::write(&path, r#"{"density_divisor": 4500}"#).unwrap();
        let args = RunArgs {
            params_file: Some(path),
            ..RunArgs::default()
        };
        assert_eq!(args.recipe().unwrap().params, json!({"density_divisor": 4500}));
    }

    #[test]
    fn malformed_params_is_input_error() {
        let args = RunArgs {
            params: Some("{oops".into()),
            ..RunArgs::default()
        };
        assert_eq!(args.recipe().unwrap_err().exit_code(), 12);

        let args = RunArgs {
            params: Some("[1, 2]".into()),
            ..RunArgs::default()
        };
        assert_eq!(args.recipe().unwrap_err().exit_code(), 12);
    }

    #[test]
    fn missing_recipe_file_is_io_error() {
        let args = RunArgs {
            recipe: Some(PathBuf::from("/nonexistent/plexus/recipe.json")),
            ..RunArgs::default()
        };
        assert_eq!(args.recipe().unwrap_err().exit_code(), 11);
    }

    #[test]
    fn zero_frames_is_not_drawable() {
        let args = RunArgs {
            frames: Some(0),
            ..RunArgs::default()
        };
        let r = args.recipe().unwrap();
        assert_eq!(ensure_drawable(&r, true).unwrap_err().exit_code(), 12);
        assert_eq!(ensure_drawable(&r, false).unwrap_err().exit_code(), 12);
    }

    #[test]
    fn empty_final_size_is_not_drawable() {
        let args = RunArgs {
            frames: Some(10),
            resizes: vec!["0x0@9".parse().unwrap()],
            ..RunArgs::default()
        };
        let r = args.recipe().unwrap();
        assert_eq!(ensure_drawable(&r, true).unwrap_err().exit_code(), 12);
        assert!(ensure_drawable(&r, false).is_ok());

        let args = RunArgs {
            frames: Some(10),
            resizes: vec!["0x0@3".parse().unwrap(), "64x64@6".parse().unwrap()],
            ..RunArgs::default()
        };
        assert!(ensure_drawable(&args.recipe().unwrap(), true).is_ok());
    }

    #[test]
    fn oversized_resize_is_backdrop_error() {
        let args = RunArgs {
            frames: Some(1),
            resizes: vec!["4000000000x4000000000@0".parse().unwrap()],
            ..RunArgs::default()
        };
        assert_eq!(args.recipe().unwrap_err().exit_code(), 10);
    }

    #[test]
    fn zero_width_is_backdrop_error() {
        let args = RunArgs {
            width: Some(0),
            ..RunArgs::default()
        };
        assert_eq!(args.recipe().unwrap_err().exit_code(), 10);
    }
}
