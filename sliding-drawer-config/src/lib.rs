#[macro_use]
extern crate tracing;

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use knuffel::errors::DecodeError;
use miette::{Context as _, IntoDiagnostic as _};

pub mod orientation;
pub mod utils;

pub use crate::orientation::{Orientation, OrientationBits, OrientationError};
pub use crate::utils::FloatOrInt;

#[derive(knuffel::Decode, Debug, Clone, PartialEq)]
pub struct Config {
    #[knuffel(child, default)]
    pub drawer: Drawer,
    #[knuffel(child, default)]
    pub physics: Physics,
    #[knuffel(child, default)]
    pub animations: Animations,
}

/// Drawer layout attributes.
#[derive(knuffel::Decode, Debug, Default, Clone, PartialEq)]
pub struct Drawer {
    #[knuffel(child, unwrap(argument), default)]
    pub orientation: Orientation,
    /// Id of the child that the user drags.
    #[knuffel(child, unwrap(argument))]
    pub handle: Option<String>,
    /// Id of the child that slides together with the handle.
    #[knuffel(child, unwrap(argument))]
    pub content: Option<String>,
    /// How far the handle hides past the closed edge, in pixels.
    #[knuffel(child, unwrap(argument), default)]
    pub collapsed_offset: u16,
    /// How far the handle stops short of the open edge, in pixels.
    #[knuffel(child, unwrap(argument), default)]
    pub expanded_offset: u16,
    #[knuffel(child)]
    pub allow_single_tap: bool,
    #[knuffel(child)]
    pub animate_on_click: bool,
    /// Only accept touches on the handle, even while open.
    #[knuffel(child)]
    pub lock_content: bool,
}

/// Density-independent gesture and motion constants.
///
/// Velocities are in dp per second, acceleration in dp per second squared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Physics {
    /// Physical pixels per dp, greater than zero.
    pub density: FloatOrInt<0, 16>,
    pub tap_threshold: u16,
    pub maximum_tap_velocity: u32,
    pub maximum_minor_velocity: u32,
    /// Non-zero.
    pub maximum_major_velocity: u32,
    /// Non-zero, otherwise flings never reach a bound.
    pub maximum_acceleration: u32,
    /// Non-zero.
    pub velocity_units: u32,
    pub touch_slop: u16,
}

#[derive(knuffel::Decode)]
struct PhysicsNode {
    #[knuffel(child, unwrap(argument), default = FloatOrInt(1.))]
    density: FloatOrInt<0, 16>,
    #[knuffel(child, unwrap(argument), default = 6)]
    tap_threshold: u16,
    #[knuffel(child, unwrap(argument), default = 100)]
    maximum_tap_velocity: u32,
    #[knuffel(child, unwrap(argument), default = 150)]
    maximum_minor_velocity: u32,
    #[knuffel(child, unwrap(argument), default = 200)]
    maximum_major_velocity: u32,
    #[knuffel(child, unwrap(argument), default = 2000)]
    maximum_acceleration: u32,
    #[knuffel(child, unwrap(argument), default = 1000)]
    velocity_units: u32,
    #[knuffel(child, unwrap(argument), default = 8)]
    touch_slop: u16,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            density: FloatOrInt(1.),
            tap_threshold: 6,
            maximum_tap_velocity: 100,
            maximum_minor_velocity: 150,
            maximum_major_velocity: 200,
            maximum_acceleration: 2000,
            velocity_units: 1000,
            touch_slop: 8,
        }
    }
}

impl<S> knuffel::Decode<S> for Physics
where
    S: knuffel::traits::ErrorSpan,
{
    fn decode_node(
        node: &knuffel::ast::SpannedNode<S>,
        ctx: &mut knuffel::decode::Context<S>,
    ) -> Result<Self, DecodeError<S>> {
        let PhysicsNode {
            density,
            tap_threshold,
            maximum_tap_velocity,
            maximum_minor_velocity,
            maximum_major_velocity,
            maximum_acceleration,
            velocity_units,
            touch_slop,
        } = knuffel::Decode::decode_node(node, ctx)?;

        if density.0 <= 0. {
            ctx.emit_error(DecodeError::conversion(node, "density must be greater than 0"));
        }
        for (name, value) in [
            ("maximum-major-velocity", maximum_major_velocity),
            ("maximum-acceleration", maximum_acceleration),
            ("velocity-units", velocity_units),
        ] {
            if value == 0 {
                ctx.emit_error(DecodeError::conversion(
                    node,
                    format!("{name} must be greater than 0"),
                ));
            }
        }

        Ok(Self {
            density,
            tap_threshold,
            maximum_tap_velocity,
            maximum_minor_velocity,
            maximum_major_velocity,
            maximum_acceleration,
            velocity_units,
            touch_slop,
        })
    }
}

#[derive(knuffel::Decode, Debug, Default, Clone, Copy, PartialEq)]
pub struct Animations {
    /// Complete every animated transition immediately.
    #[knuffel(child)]
    pub off: bool,
}

impl Config {
    pub fn load(path: &Path) -> miette::Result<Self> {
        let contents = fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("error reading {path:?}"))?;

        let config = Self::parse(
            path.file_name()
                .and_then(OsStr::to_str)
                .unwrap_or("drawer.kdl"),
            &contents,
        )
        .context("error parsing")?;
        debug!("loaded config from {path:?}");
        Ok(config)
    }

    pub fn parse(filename: &str, text: &str) -> Result<Self, knuffel::Error> {
        let _span = tracy_client::span!("Config::parse");
        knuffel::parse(filename, text)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::parse(
            "default-config.kdl",
            include_str!("../../resources/default-config.kdl"),
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn can_create_default_config() {
        let config = Config::default();
        assert_eq!(config.drawer.handle.as_deref(), Some("handle"));
        assert_eq!(config.drawer.content.as_deref(), Some("content"));
        assert!(!config.drawer.allow_single_tap);
        assert!(!config.drawer.animate_on_click);
        assert_eq!(config.physics, Physics::default());
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("config.kdl", "").unwrap();
        assert_eq!(config.drawer, Drawer::default());
        assert_eq!(config.drawer.orientation, Orientation::LeftToRight);
        assert_eq!(config.physics, Physics::default());
        assert!(!config.animations.off);
    }

    #[track_caller]
    fn do_parse(text: &str) -> Config {
        Config::parse("test.kdl", text)
            .map_err(miette::Report::new)
            .unwrap()
    }

    #[test]
    fn parse() {
        let parsed = do_parse(
            r##"
            drawer {
                orientation "bottom-up"
                handle "grip"
                content "panel"
                collapsed-offset 12
                expanded-offset 48
                allow-single-tap
                animate-on-click
                lock-content
            }

            physics {
                density 2.5
                tap-threshold 4
                maximum-tap-velocity 120
                maximum-minor-velocity 160
                maximum-major-velocity 220
                maximum-acceleration 2400
                velocity-units 1000
                touch-slop 10
            }

            animations {
                off
            }
            "##,
        );

        assert_eq!(
            parsed,
            Config {
                drawer: Drawer {
                    orientation: Orientation::BottomUp,
                    handle: Some(String::from("grip")),
                    content: Some(String::from("panel")),
                    collapsed_offset: 12,
                    expanded_offset: 48,
                    allow_single_tap: true,
                    animate_on_click: true,
                    lock_content: true,
                },
                physics: Physics {
                    density: FloatOrInt(2.5),
                    tap_threshold: 4,
                    maximum_tap_velocity: 120,
                    maximum_minor_velocity: 160,
                    maximum_major_velocity: 220,
                    maximum_acceleration: 2400,
                    velocity_units: 1000,
                    touch_slop: 10,
                },
                animations: Animations { off: true },
            }
        );
    }

    #[test]
    fn parse_orientation_bits() {
        let parsed = do_parse("drawer { orientation 8; }");
        assert_eq!(parsed.drawer.orientation, Orientation::RightToLeft);

        let parsed = do_parse("drawer { orientation 1; }");
        assert_eq!(parsed.drawer.orientation, Orientation::TopDown);
    }

    #[test]
    fn reject_invalid_orientation() {
        assert!(Config::parse("test.kdl", "drawer { orientation 0; }").is_err());
        assert!(Config::parse("test.kdl", "drawer { orientation 6; }").is_err());
        assert!(Config::parse("test.kdl", "drawer { orientation 16; }").is_err());
        assert!(Config::parse("test.kdl", r#"drawer { orientation "diagonal"; }"#).is_err());
        assert!(Config::parse("test.kdl", "drawer { orientation 1.5; }").is_err());
    }

    #[test]
    fn reject_negative_offsets() {
        assert!(Config::parse("test.kdl", "drawer { collapsed-offset -1; }").is_err());
        assert!(Config::parse("test.kdl", "drawer { expanded-offset -20; }").is_err());
    }

    #[test]
    fn reject_out_of_range_density() {
        assert!(Config::parse("test.kdl", "physics { density 17; }").is_err());
        assert!(Config::parse("test.kdl", "physics { density -1.0; }").is_err());
        assert!(Config::parse("test.kdl", "physics { density 0; }").is_err());
        assert!(Config::parse("test.kdl", "physics { density 0.0; }").is_err());
        assert!(Config::parse("test.kdl", "physics { density 0.5; }").is_ok());
    }

    #[test]
    fn reject_zero_motion_constants() {
        for node in [
            "maximum-major-velocity",
            "maximum-acceleration",
            "velocity-units",
        ] {
            let text = format!("physics {{ {node} 0; }}");
            assert!(Config::parse("test.kdl", &text).is_err(), "{node}");
        }

        // Zero is meaningful for thresholds.
        let parsed =
            do_parse("physics { tap-threshold 0; touch-slop 0; maximum-minor-velocity 0; }");
        assert_eq!(parsed.physics.tap_threshold, 0);
        assert_eq!(parsed.physics.touch_slop, 0);
        assert_eq!(parsed.physics.maximum_minor_velocity, 0);
    }
}
