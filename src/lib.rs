//! Template meshes of quadratic (6-point) triangles.
//!
//! A [Mesh] collects triangles (or finalized sub-meshes) and identifies their local points into global parameters.
//! The [Composer] assembles ready-made shapes from it (patches, strips, rings, hemispheres, spheres and a head on a
//! neck), numbering each shape's global parameters rail by rail so that [coords] can synthesize matching
//! coordinates.
//!
//! ```
//! use fem_templates::{Composer, SphereParams};
//!
//! let composer = Composer::default();
//! let head = composer.sphere(&SphereParams::truncated(5, 3, 1.0, 2.4)).unwrap();
//!
//! assert_eq!(head.coords.len(), head.mesh.num_params());
//! assert!(head.connect_points.is_some());
//! ```

/// Coordinates aligned with rail-ordered global parameters
pub mod coords;
/// Errors produced while building meshes
pub mod error;
/// Ready-made shapes
pub mod shapes;
/// Elements, identification of local points, and global parameter numbering
pub mod topology;

pub use coords::Coordinates;
pub use error::{MeshError, MeshResult, RemapError};
pub use shapes::{Composer, HeadNeckParams, Orientation, RailRadii, SphereParams, Surface};
pub use topology::{Element, GlobalParameter, LocalPointRef, Mesh, RemapTable};
