//! Discrete conformal relaxation of kite meshes.
//!
//! A kite mesh is a grid of "plus-sign" vertices, each connected to up to
//! four axial neighbors, enclosed by a four-sided border. Relaxation moves
//! every movable vertex towards a smooth, locally consistent configuration
//! while keeping under-constrained vertices glued to the border.
//!
//! Main components:
//! - [`geometry`]: segment projection, rotation and signed angles on `Vec2`.
//! - [`vertex`]: the plus-sign vertex record.
//! - [`grid`]: fixed-size vertex grid and neighbor lookup.
//! - [`border`]: the mesh outline and the border projector.
//! - [`mesh`]: quad meshes, their kind tag and editing helpers.
//! - [`relax`]: the simple and full single-mesh steps.
//! - [`engine`]: batch drivers, displacement bookkeeping and the
//!   convergence loop.
//! - [`config`]: engine configuration.
//! - [`error`]: error types for mesh construction and configuration.
//! - [`types`]: shared type aliases.
//!
//! ```
//! use glam::Vec2;
//! use relax_core::{
//!     border::Border,
//!     config::{RelaxConfig, StepMode},
//!     engine::Relaxer,
//!     mesh::{MeshKind, QuadMesh},
//! };
//!
//! let border = Border::rect(Vec2::ZERO, Vec2::splat(4.0));
//! let mut mesh = QuadMesh::from_border(MeshKind::Kite, border, 5, 5).unwrap();
//! mesh.fix_outline();
//! mesh.set_position((2, 2), Vec2::new(2.5, 1.5)).unwrap();
//!
//! let mut relaxer = Relaxer::new(RelaxConfig::default()).unwrap();
//! let outcome = relaxer.run(std::slice::from_mut(&mut mesh), StepMode::Simple);
//! assert!(outcome.converged);
//! ```

pub mod border;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod mesh;
pub mod relax;
pub mod types;
pub mod vertex;

pub use border::closest_border_point;
pub use error::{MeshError, Result};

// Re-export glam so callers build points with the same version.
pub use glam;
