// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! # Pose Overlay
//!
//! Reads pose-estimation outputs (person-center coordinates and per-joint
//! heat maps) from an external video-processing framework's job store,
//! converts the heat maps into 14-joint skeletons, and overlays the
//! skeletons onto decoded video frames as numbered JPEG images.
//!
//! The pipeline is strictly one-way:
//!
//! ```text
//! job outputs -> heat-map decoder -> pose assembler -> frame compositor -> image file
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use pose_overlay::{Config, Database, Driver, LoaderRegistry};
//!
//! fn main() -> pose_overlay::Result<()> {
//!     let config = Config::load()?;
//!     let registry = LoaderRegistry::with_defaults();
//!     let db = Database::new(&config);
//!     Driver::new(&db, &registry).run("kitchen_videos")
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! pose-overlay <DATASET_NAME> <JOB_NAME>
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`codec`] | Bounds-checked binary record reader and the points sub-format |
//! | [`loader`] | Explicit loader registry keyed by stream name |
//! | [`config`] | TOML configuration locating the job database |
//! | [`job`] | Job-output iteration and dataset metadata |
//! | [`heatmap`] | Heat-map decoding: 8x cubic upsample and argmax |
//! | [`pose`] | Body parts, limb table, pose assembly |
//! | [`annotate`] | Frame compositing: circles and translucent limb overlays |
//! | [`source`] | Forward-only frame sources (`video-rs` behind the `video` feature) |
//! | [`driver`] | Output driver writing annotated JPEGs |
//! | [`error`] | Error types ([`OverlayError`], [`Result`]) |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `video` | Video file decoding via `video-rs` |

// Modules
pub mod annotate;
pub mod cli;
pub mod codec;
pub mod config;
pub mod driver;
pub mod error;
pub mod heatmap;
pub mod job;
pub mod loader;
pub mod pose;
pub mod source;

// Re-export main types for convenience
pub use config::Config;
pub use driver::{Driver, RenderPlan};
pub use error::{OverlayError, Result};
pub use job::{Database, DatasetMeta, VideoOutput};
pub use loader::{Decoded, LoaderRegistry};
pub use pose::{BodyPart, PersonCenter, Pose};
pub use source::FrameSource;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
