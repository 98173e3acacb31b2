//! Reproducible description of a backdrop run.
//!
//! A [`Recipe`] captures the initial surface size, config params, PRNG seed,
//! frame count and any resizes scheduled along the way. Two identical
//! recipes produce identical draw command streams.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::backdrop::Backdrop;
use crate::driver::ScriptedHost;
use crate::error::BackdropError;
use crate::surface::{check_surface_size, MAX_SURFACE_SIDE};

/// A viewport change applied just before the 0-based frame `frame`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduledResize {
    pub frame: u64,
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for ScheduledResize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@{}", self.width, self.height, self.frame)
    }
}

/// Parses `WIDTHxHEIGHT@FRAME`, e.g. `640x480@30`.
impl FromStr for ScheduledResize {
    type Err = BackdropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || {
            BackdropError::invalid_param("resize", format!("expected WIDTHxHEIGHT@FRAME, got {s:?}"))
        };
        let (size, frame) = s.trim().split_once('@').ok_or_else(bad)?;
        let (width, height) = size.split_once(['x', 'X']).ok_or_else(bad)?;
        Ok(Self {
            frame: frame.trim().parse().map_err(|_| bad())?,
            width: width.trim().parse().map_err(|_| bad())?,
            height: height.trim().parse().map_err(|_| bad())?,
        })
    }
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub width: u32,
    pub height: u32,
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
    pub seed: u64,
    #[serde(default)]
    pub frames: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resizes: Vec<ScheduledResize>,
}

impl Recipe {
    /// A recipe with default params (`{}`), zero frames and no resizes.
    pub fn new(width: u32, height: u32, seed: u64) -> Self {
        Self {
            width,
            height,
            params: empty_params(),
            seed,
            frames: 0,
            resizes: Vec::new(),
        }
    }

    /// Rejects a zero-sized initial surface, any size (initial or scheduled)
    /// with a side above [`MAX_SURFACE_SIDE`], and resizes scheduled past
    /// the last frame.
    ///
    /// Resizes to zero are allowed; they empty the field.
    pub fn validate(&self) -> Result<(), BackdropError> {
        if self.width == 0 || self.height == 0 {
            return Err(BackdropError::InvalidDimensions);
        }
        check_surface_size(self.width, self.height)?;
        for r in &self.resizes {
            if r.frame >= self.frames {
                return Err(BackdropError::invalid_param(
                    "resizes",
                    format!("{r} is scheduled after the last frame ({})", self.frames),
                ));
            }
            check_surface_size(r.width, r.height)?;
        }
        Ok(())
    }

    /// Surface size after the last scheduled resize has applied.
    pub fn final_size(&self) -> (u32, u32) {
        // ties resolve to the later entry, as in the replay order
        self.resizes
            .iter()
            .max_by_key(|r| r.frame)
            .map_or((self.width, self.height), |r| (r.width, r.height))
    }

    /// Validates, then builds an unseeded backdrop from `params` and `seed`.
    pub fn backdrop(&self) -> Result<Backdrop, BackdropError> {
        self.validate()?;
        Backdrop::from_json(&self.params, self.seed)
    }

    /// A host that replays this recipe's size, frames and resizes.
    pub fn host(&self) -> ScriptedHost {
        ScriptedHost::new(self.width, self.height, self.frames, self.resizes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::AnimationDriver;
    use crate::surface::RecordingSurface;

    #[test]
    fn new_has_empty_params_and_no_frames() {
        let r = Recipe::new(800, 600, 42);
        assert_eq!(r.params, serde_json::json!({}));
        assert_eq!(r.frames, 0);
        assert!(r.resizes.is_empty());
    }

    #[test]
    fn deserializes_with_defaults() {
        let r: Recipe =
            serde_json::from_str(r#"{"width": 320, "height": 200, "seed": 7}"#).unwrap();
        assert_eq!(r, Recipe::new(320, 200, 7));
    }

    #[test]
    fn json_keeps_resizes_and_params() {
        let mut r = Recipe::new(640, 480, 3);
        r.frames = 60;
        r.params = serde_json::json!({"density_divisor": 4500});
        r.resizes.push("320x240@30".parse().unwrap());
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["resizes"][0]["frame"], 30);
        assert_eq!(v["params"]["density_divisor"], 4500);
        let back: Recipe = serde_json::from_value(v).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn parses_scheduled_resize() {
        let r: ScheduledResize = "1024x768@12".parse().unwrap();
        assert_eq!(
            r,
            ScheduledResize {
                frame: 12,
                width: 1024,
                height: 768
            }
        );
        assert_eq!(r.to_string(), "1024x768@12");
        assert!("1024x768".parse::<ScheduledResize>().is_err());
        assert!("axb@1".parse::<ScheduledResize>().is_err());
        assert!("10x10@-1".parse::<ScheduledResize>().is_err());
    }

    #[test]
    fn validate_rejects_zero_dimensions() {
        assert!(Recipe::new(0, 600, 1).validate().is_err());
        assert!(Recipe::new(800, 0, 1).validate().is_err());
        assert!(Recipe::new(800, 600, 1).validate().is_ok());
    }

    #[test]
    fn validate_rejects_resize_after_last_frame() {
        let mut r = Recipe::new(800, 600, 1);
        r.frames = 10;
        r.resizes.push(ScheduledResize {
            frame: 10,
            width: 100,
            height: 100,
        });
        assert!(r.validate().is_err());
        r.resizes[0].frame = 9;
        assert!(r.validate().is_ok());
    }

    #[test]
    fn validate_rejects_oversized_scheduled_resize() {
        let mut r = Recipe::new(800, 600, 1);
        r.frames = 1;
        r.resizes.push("4000000000x4000000000@0".parse().unwrap());
        assert!(matches!(r.validate(), Err(BackdropError::InvalidDimensions)));
        assert!(r.backdrop().is_err());

        r.resizes[0] = ScheduledResize {
            frame: 0,
            width: MAX_SURFACE_SIDE + 1,
            height: 10,
        };
        assert!(r.validate().is_err());
        r.resizes[0].width = MAX_SURFACE_SIDE;
        assert!(r.validate().is_ok());
    }

    #[test]
    fn validate_rejects_oversized_initial_size() {
        assert!(Recipe::new(4_000_000_000, 600, 1).validate().is_err());
        assert!(Recipe::new(800, MAX_SURFACE_SIDE + 1, 1).validate().is_err());
    }

    #[test]
    fn final_size_follows_last_resize() {
        let mut r = Recipe::new(800, 600, 1);
        r.frames = 10;
        assert_eq!(r.final_size(), (800, 600));
        r.resizes.push("100x50@7".parse().unwrap());
        r.resizes.push("300x200@2".parse().unwrap());
        assert_eq!(r.final_size(), (100, 50));
        r.resizes.push("0x0@7".parse().unwrap());
        assert_eq!(r.final_size(), (0, 0));
    }

    #[test]
    fn backdrop_rejects_bad_params() {
        let mut r = Recipe::new(800, 600, 1);
        r.params = serde_json::json!({"max_radius": -3});
        assert!(r.backdrop().is_err());
    }

    #[test]
    fn replaying_a_recipe_applies_resizes() {
        let mut r = Recipe::new(900, 900, 5);
        r.frames = 4;
        r.resizes.push("285x285@2".parse().unwrap());

        let mut b = r.backdrop().unwrap();
        let mut s = RecordingSurface::new(0, 0);
        let mut d = AnimationDriver::new();
        let frames = d.run(&mut b, &mut s, &mut r.host()).unwrap();

        assert_eq!(frames, 4);
        assert_eq!(b.particles().len(), 9);
        assert_eq!((s.width(), s.height()), (285, 285));
        assert_eq!(b.field().generation(), 2);
    }
}
