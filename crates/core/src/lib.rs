#![deny(unsafe_code)]
//! Core simulation for the plexus animated backdrop.
//!
//! A field of slowly drifting particles bounces inside a rectangular
//! surface; every pair closer than a size-relative threshold is joined by a
//! line that fades with distance. Drawing goes through the [`Surface`]
//! trait so the same simulation feeds a browser canvas, an offscreen raster
//! or a [`RecordingSurface`] in tests.
//!
//! Provides [`Particle`], [`ParticleField`], [`ProximityLinker`],
//! [`SurfaceController`], [`Backdrop`], [`AnimationDriver`] and its host
//! seam ([`FrameHost`]), [`BackdropConfig`], the `Xorshift64` PRNG and
//! [`Recipe`] for reproducible runs.

pub mod backdrop;
pub mod color;
pub mod config;
pub mod controller;
pub mod driver;
pub mod error;
pub mod field;
pub mod linker;
pub mod params;
pub mod particle;
pub mod prng;
pub mod recipe;
pub mod surface;

pub use backdrop::Backdrop;
pub use color::Srgb;
pub use config::BackdropConfig;
pub use controller::SurfaceController;
pub use driver::{
    AnimationDriver, DriverState, FrameHost, FramePacer, FrameStats, HostEvent, ScriptedHost,
    StopHandle,
};
pub use error::BackdropError;
pub use field::{ParticleField, SpawnParams};
pub use linker::{Link, ProximityLinker};
pub use particle::Particle;
pub use prng::Xorshift64;
pub use recipe::{Recipe, ScheduledResize};
pub use surface::{
    check_surface_size, DrawCommand, RecordingSurface, Surface, SurfaceDimensions,
    MAX_SURFACE_SIDE,
};
