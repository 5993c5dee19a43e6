//! # Spiral Galaxy
//!
//! Procedural spiral-galaxy point clouds, rendered with wgpu and viewed
//! from an orbiting camera.
//!
//! The crate is split into a pure core that needs no GPU and a thin host
//! layer around it:
//!
//! - [`galaxy::generate`] turns a [`GalaxyParameters`] snapshot into a
//!   [`PointField`] of positions and colors.
//! - [`OrbitController`] owns the camera transform and eases its rotation
//!   speed when paused or resumed.
//! - [`SimulationContext`] holds the current snapshot, field and
//!   controller, and hands fields to a [`FieldSink`].
//! - [`Galaxy`] opens a window, draws the field with one instanced
//!   point-sprite pipeline and shows a parameter panel.
//!
//! ## Quick Start
//!
//! ```ignore
//! use spiral_galaxy::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     Galaxy::new()
//!         .with_parameters(GalaxyParameters {
//!             branches: 5,
//!             spin: -1.5,
//!             ..Default::default()
//!         })
//!         .run()
//! }
//! ```
//!
//! ## Generation
//!
//! For point `i` the generator picks a radius `r` in `[0, radius)`, an
//! arm angle `(i mod branches) / branches * 2π` and a twist `r * spin`,
//! then adds per-axis jitter that concentrates near the arms as
//! `randomness_power` grows. Color blends from `inside_color` at the
//! center to `outside_color` at `radius`.
//!
//! ```
//! use spiral_galaxy::{galaxy, GalaxyParameters};
//!
//! let params = GalaxyParameters { count: 1_000, ..Default::default() };
//! let field = galaxy::generate_seeded(&params, 7);
//! assert_eq!(field.len(), 1_000);
//! assert_eq!(field, galaxy::generate_seeded(&params, 7));
//! ```
//!
//! ## Controls
//!
//! | Input       | Effect                                 |
//! |-------------|----------------------------------------|
//! | Space       | Pause or resume the orbit              |
//! | C           | Switch between follow and free camera  |
//! | R           | Regenerate with the current parameters |
//! | Mouse wheel | Zoom                                   |
//! | Left drag   | Orbit (free camera only)               |
//! | Escape      | Quit                                   |
//!
//! ## Presets
//!
//! [`GalaxyConfig`] stores parameters, seed, camera and material as JSON.
//! The binary takes an optional preset path, and the panel's save button
//! writes [`config::DEFAULT_PRESET_FILE`].

pub mod app;
pub mod camera;
pub mod config;
pub mod context;
pub mod error;
pub mod galaxy;
pub mod gpu;
pub mod input;
#[cfg(feature = "egui")]
pub mod panel;
pub mod params;
pub mod textures;
pub mod time;
pub mod visuals;

pub use app::Galaxy;
pub use camera::{CameraMode, CameraPose, ControlState, OrbitController};
pub use config::GalaxyConfig;
pub use context::{FieldSink, SimulationContext};
pub use error::{AppError, ColorParseError, GpuError, PresetError, TextureError};
pub use galaxy::{PointField, PointVertex};
pub use glam::Vec3;
pub use params::{Color, GalaxyParameters, ParamBounds};
pub use textures::SpriteTexture;
pub use visuals::{BlendMode, PointMaterial};

/// Everything needed to configure and run a viewer.
pub mod prelude {
    pub use crate::app::Galaxy;
    pub use crate::camera::{CameraMode, OrbitController};
    pub use crate::config::GalaxyConfig;
    pub use crate::context::{FieldSink, SimulationContext};
    pub use crate::error::AppError;
    pub use crate::galaxy::PointField;
    pub use crate::params::{Color, GalaxyParameters};
    pub use crate::visuals::BlendMode;
    pub use glam::Vec3;
}
