//! Tunable constants for the backdrop, read from a JSON params object.
//!
//! Defaults reproduce the website backdrop: one particle per 9000 px² of
//! surface, radii in [1, 3), speeds within ±0.2 px/tick, links under
//! `(w/7)*(h/7)` squared pixels fading out at 20000, everything in `#3b82f6`
//! over a `#050507` page.

use crate::color::Srgb;
use crate::error::BackdropError;
use crate::params::{param_f64, param_string, param_strings};
use serde_json::{json, Value};

/// Surface area (px²) per particle.
pub const DEFAULT_DENSITY_DIVISOR: f64 = 9000.0;
pub const DEFAULT_MIN_RADIUS: f64 = 1.0;
pub const DEFAULT_MAX_RADIUS: f64 = 3.0;
/// Upper bound of each velocity component's magnitude, px/tick.
pub const DEFAULT_MAX_SPEED: f64 = 0.2;
/// Each surface axis is divided by this before forming the squared link threshold.
pub const DEFAULT_LINK_DIVISOR: f64 = 7.0;
/// Squared distance at which link opacity reaches zero.
pub const DEFAULT_OPACITY_FALLOFF: f64 = 20000.0;
pub const DEFAULT_LINE_WIDTH: f64 = 1.0;
pub const DEFAULT_PARTICLE_COLOR: &str = "#3b82f6";
pub const DEFAULT_LINK_COLOR: &str = "#3b82f6";
pub const DEFAULT_BACKGROUND: &str = "#050507";

/// Every knob of the simulation and its rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct BackdropConfig {
    pub density_divisor: f64,
    pub min_radius: f64,
    pub max_radius: f64,
    pub max_speed: f64,
    pub link_divisor: f64,
    pub opacity_falloff: f64,
    pub line_width: f64,
    /// Each particle picks one of these at creation.
    pub particle_colors: Vec<Srgb>,
    pub link_color: Srgb,
    /// Page color behind the (transparent) surface, used when flattening snapshots.
    pub background: Srgb,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            density_divisor: DEFAULT_DENSITY_DIVISOR,
            min_radius: DEFAULT_MIN_RADIUS,
            max_radius: DEFAULT_MAX_RADIUS,
            max_speed: DEFAULT_MAX_SPEED,
            link_divisor: DEFAULT_LINK_DIVISOR,
            opacity_falloff: DEFAULT_OPACITY_FALLOFF,
            line_width: DEFAULT_LINE_WIDTH,
            particle_colors: vec![Srgb::from_rgb8(0x3b, 0x82, 0xf6)],
            link_color: Srgb::from_rgb8(0x3b, 0x82, 0xf6),
            background: Srgb::from_rgb8(0x05, 0x05, 0x07),
        }
    }
}

impl BackdropConfig {
    /// Reads a config from a JSON params object, defaulting every missing key.
    ///
    /// Unlike the numeric lookups, colors must parse, and the numeric values
    /// must describe a usable simulation (see [`BackdropConfig::validate`]).
    pub fn from_json(params: &Value) -> Result<Self, BackdropError> {
        let particle_colors = param_strings(params, "particle_colors", &[DEFAULT_PARTICLE_COLOR])
            .iter()
            .map(|hex| Srgb::from_hex(hex))
            .collect::<Result<Vec<_>, _>>()?;
        let config = Self {
            density_divisor: param_f64(params, "density_divisor", DEFAULT_DENSITY_DIVISOR),
            min_radius: param_f64(params, "min_radius", DEFAULT_MIN_RADIUS),
            max_radius: param_f64(params, "max_radius", DEFAULT_MAX_RADIUS),
            max_speed: param_f64(params, "max_speed", DEFAULT_MAX_SPEED),
            link_divisor: param_f64(params, "link_divisor", DEFAULT_LINK_DIVISOR),
            opacity_falloff: param_f64(params, "opacity_falloff", DEFAULT_OPACITY_FALLOFF),
            line_width: param_f64(params, "line_width", DEFAULT_LINE_WIDTH),
            particle_colors,
            link_color: Srgb::from_hex(&param_string(params, "link_color", DEFAULT_LINK_COLOR))?,
            background: Srgb::from_hex(&param_string(params, "background", DEFAULT_BACKGROUND))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make seeding or linking meaningless.
    pub fn validate(&self) -> Result<(), BackdropError> {
        let positive = [
            ("density_divisor", self.density_divisor),
            ("link_divisor", self.link_divisor),
            ("opacity_falloff", self.opacity_falloff),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(BackdropError::invalid_param(
                    name,
                    format!("must be a positive finite number, got {value}"),
                ));
            }
        }
        let non_negative = [
            ("min_radius", self.min_radius),
            ("max_speed", self.max_speed),
            ("line_width", self.line_width),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(BackdropError::invalid_param(
                    name,
                    format!("must be a non-negative finite number, got {value}"),
                ));
            }
        }
        if !self.max_radius.is_finite() || self.max_radius < self.min_radius {
            return Err(BackdropError::invalid_param(
                "max_radius",
                format!(
                    "must be finite and >= min_radius ({}), got {}",
                    self.min_radius, self.max_radius
                ),
            ));
        }
        if self.particle_colors.is_empty() {
            return Err(BackdropError::invalid_param(
                "particle_colors",
                "at least one color is required",
            ));
        }
        Ok(())
    }

    /// Current values in the same shape [`BackdropConfig::from_json`] reads.
    pub fn params(&self) -> Value {
        let colors: Vec<String> = self.particle_colors.iter().map(|c| c.to_hex()).collect();
        json!({
            "density_divisor": self.density_divisor,
            "min_radius": self.min_radius,
            "max_radius": self.max_radius,
            "max_speed": self.max_speed,
            "link_divisor": self.link_divisor,
            "opacity_falloff": self.opacity_falloff,
            "line_width": self.line_width,
            "particle_colors": colors,
            "link_color": self.link_color.to_hex(),
            "background": self.background.to_hex(),
        })
    }

    /// Types, defaults, ranges and descriptions of every parameter.
    pub fn param_schema() -> Value {
        json!({
            "density_divisor": {
                "type": "number",
                "default": DEFAULT_DENSITY_DIVISOR,
                "min": 1.0,
                "description": "Surface area in px² per particle; population is floor(w*h/density_divisor)"
            },
            "min_radius": {
                "type": "number",
                "default": DEFAULT_MIN_RADIUS,
                "min": 0.0,
                "description": "Smallest particle radius in px"
            },
            "max_radius": {
                "type": "number",
                "default": DEFAULT_MAX_RADIUS,
                "min": 0.0,
                "description": "Radius upper bound in px (exclusive)"
            },
            "max_speed": {
                "type": "number",
                "default": DEFAULT_MAX_SPEED,
                "min": 0.0,
                "max": 5.0,
                "description": "Each velocity component is drawn from [-max_speed, max_speed) px/tick"
            },
            "link_divisor": {
                "type": "number",
                "default": DEFAULT_LINK_DIVISOR,
                "min": 1.0,
                "description": "Pairs link when squared distance < (w/link_divisor)*(h/link_divisor)"
            },
            "opacity_falloff": {
                "type": "number",
                "default": DEFAULT_OPACITY_FALLOFF,
                "min": 1.0,
                "description": "Link opacity is 1 - squared_distance/opacity_falloff, clamped to [0, 1]"
            },
            "line_width": {
                "type": "number",
                "default": DEFAULT_LINE_WIDTH,
                "min": 0.0,
                "max": 10.0,
                "description": "Link stroke width in px"
            },
            "particle_colors": {
                "type": "array",
                "default": [DEFAULT_PARTICLE_COLOR],
                "description": "Hex colors; each particle picks one uniformly at creation"
            },
            "link_color": {
                "type": "string",
                "default": DEFAULT_LINK_COLOR,
                "description": "Hex color of proximity lines"
            },
            "background": {
                "type": "string",
                "default": DEFAULT_BACKGROUND,
                "description": "Hex page color behind the surface, used for snapshots"
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_named_constants() {
        let c = BackdropConfig::default();
        assert_eq!(c.density_divisor, 9000.0);
        assert_eq!(c.link_divisor, 7.0);
        assert_eq!(c.opacity_falloff, 20000.0);
        assert_eq!(c.particle_colors[0].to_hex(), DEFAULT_PARTICLE_COLOR);
        assert_eq!(c.link_color.to_hex(), DEFAULT_LINK_COLOR);
        assert_eq!(c.background.to_hex(), DEFAULT_BACKGROUND);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_json_yields_default() {
        let c = BackdropConfig::from_json(&json!({})).unwrap();
        assert_eq!(c, BackdropConfig::default());
    }

    #[test]
    fn from_json_overrides_named_keys_only() {
        let c = BackdropConfig::from_json(&json!({
            "max_speed": 0.5,
            "particle_colors": ["#3b82f6", "#8b5cf6"],
            "link_color": "#8b5cf6"
        }))
        .unwrap();
        assert_eq!(c.max_speed, 0.5);
        assert_eq!(c.particle_colors.len(), 2);
        assert_eq!(c.link_color.to_hex(), "#8b5cf6");
        assert_eq!(c.density_divisor, DEFAULT_DENSITY_DIVISOR);
    }

    #[test]
    fn from_json_rejects_bad_color() {
        let result = BackdropConfig::from_json(&json!({"link_color": "blue"}));
        assert!(matches!(result, Err(BackdropError::InvalidColor(_))));
    }

    #[test]
    fn from_json_rejects_zero_density_divisor() {
        let result = BackdropConfig::from_json(&json!({"density_divisor": 0}));
        assert!(matches!(
            result,
            Err(BackdropError::InvalidParam { ref name, .. }) if name == "density_divisor"
        ));
    }

    #[test]
    fn from_json_rejects_inverted_radius_range() {
        let result = BackdropConfig::from_json(&json!({"min_radius": 4.0, "max_radius": 2.0}));
        assert!(matches!(
            result,
            Err(BackdropError::InvalidParam { ref name, .. }) if name == "max_radius"
        ));
    }

    #[test]
    fn from_json_rejects_empty_color_list() {
        let result = BackdropConfig::from_json(&json!({"particle_colors": []}));
        assert!(matches!(
            result,
            Err(BackdropError::InvalidParam { ref name, .. }) if name == "particle_colors"
        ));
    }

    #[test]
    fn params_round_trip_through_from_json() {
        let first = BackdropConfig::from_json(&json!({
            "max_speed": 0.3,
            "line_width": 2.0,
            "particle_colors": ["#ff0000", "#00ff00"],
            "background": "#101010"
        }))
        .unwrap();
        let restored = BackdropConfig::from_json(&first.params()).unwrap();
        assert_eq!(first, restored);
    }

    #[test]
    fn schema_describes_every_param_key() {
        let params = BackdropConfig::default().params();
        let schema = BackdropConfig::param_schema();
        for key in params.as_object().unwrap().keys() {
            let entry = schema.get(key).unwrap_or_else(|| panic!("schema missing {key}"));
            assert!(entry.get("type").is_some(), "{key} missing 'type'");
            assert!(entry.get("default").is_some(), "{key} missing 'default'");
            assert!(entry.get("description").is_some(), "{key} missing 'description'");
        }
    }
}
