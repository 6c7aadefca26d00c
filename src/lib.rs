//! Re-tile a pre-modelled storage bin into an arbitrary grid size.
//!
//! An input bin laid out as N×M identical cells is cut down to one
//! representative cell with a boolean intersection. The cell is split into
//! twelve axis-aligned regions around its corner radius (outer corners,
//! wall runs, seam pieces, floor), which are then rotated in quarter turns,
//! mirrored, stretched and translated to build an R×C container with the
//! same corner and wall styling. Pieces are stitched by welding (or by
//! boolean union), repaired, and written back out as binary STL.
//!
//! Booleans go through the [`BooleanEngine`](traits::BooleanEngine) trait;
//! [`BspEngine`](mesh::bsp::BspEngine) is the bundled BSP-tree implementation.
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//! - [**stl-io**](https://en.wikipedia.org/wiki/STL_(file_format)): `.stl` import/export
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **async**: `pipeline::generate_async`, running the pipeline on tokio's blocking pool

#![forbid(unsafe_code)]
#![warn(clippy::approx_constant, clippy::all)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod debug;
pub mod errors;
pub mod float_types;
pub mod grid;
pub mod io;
pub mod mesh;
pub mod pipeline;
pub mod traits;

pub use errors::GridError;
pub use grid::GridSize;
pub use mesh::Mesh;
pub use pipeline::GenerateOptions;

#[cfg(all(feature = "f64", feature = "f32"))]
compile_error!("Features 'f64' and 'f32' cannot be enabled at the same time");

#[cfg(not(any(feature = "f64", feature = "f32")))]
compile_error!("Either 'f64' or 'f32' feature must be specified");
