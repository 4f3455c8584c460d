/// Anatomical composite: a truncated sphere on a tapered neck
pub mod head_neck;
/// Hemispherical fans of triangles and patches
pub mod hemisphere;
/// Fixed patches and triangular strips
pub mod patches;
/// Rail and row layouts used to derive geometric orderings
pub mod rails;
/// Closed rings of patches
pub mod rings;
/// Full and truncated spheres assembled from caps and rings
pub mod sphere;

pub use head_neck::HeadNeckParams;
pub use rails::{PatchRows, Rails};
pub use rings::RailRadii;
pub use sphere::SphereParams;

use crate::coords::Coordinates;
use crate::error::{MeshError, MeshResult};
use crate::topology::Mesh;

#[cfg(feature = "json_export")]
use json::{object, JsonValue};
use tracing::{debug, debug_span, dispatcher, warn, Dispatch};

/// Builds template meshes.
///
/// Each builder creates and stitches elements, finalizes the mesh, and applies a remap that puts the global
/// parameters into the shape's geometric order (see the individual builders for each layout).
///
/// Diagnostics are emitted through the `Composer`'s own [Dispatch], which is installed for the duration of each
/// build. Nothing is registered globally.
#[derive(Debug, Clone)]
pub struct Composer {
    dispatch: Dispatch,
}

impl Composer {
    /// Create a Composer that reports to `dispatch`
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// Create a Composer that discards all diagnostics
    pub fn silent() -> Self {
        Self::new(Dispatch::none())
    }

    /// Run one build with this Composer's dispatcher installed, inside a span naming the shape
    fn scoped<T>(&self, shape: &'static str, build: impl FnOnce() -> MeshResult<T>) -> MeshResult<T> {
        dispatcher::with_default(&self.dispatch, || {
            let _span = debug_span!("build", shape).entered();
            let result = build();
            if let Err(err) = &result {
                debug!(%err, "aborted {}", shape);
            }
            result
        })
    }

    /// Identify a group of local points, logging the failure if any of them do not exist
    fn connect<I>(&self, mesh: &mut Mesh, refs: I) -> MeshResult<()>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let refs: Vec<(usize, usize)> = refs.into_iter().collect();
        mesh.connect_points(refs.iter().copied()).map_err(|err| {
            warn!(mesh = %mesh.name, ?refs, %err, "connecting failed");
            err
        })
    }
}

impl Default for Composer {
    /// A Composer reporting to the dispatcher that is current when it is created
    fn default() -> Self {
        Self::new(dispatcher::get_default(|current| current.clone()))
    }
}

/// Which way a ring or cap is numbered along the z axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Rails run from the wide bottom rail up to the narrow top (or apex)
    #[default]
    Upward,
    /// Rails run from the narrow end (or apex) down to the wide rail, for the lower half of a sphere
    Downward,
}

fn require_elements(count: usize, shape: &str) -> MeshResult<()> {
    if count == 0 {
        return Err(MeshError::invalid_parameter(format!(
            "a {} needs at least one element",
            shape
        )));
    }
    Ok(())
}

fn require_finite(value: f64, what: &str) -> MeshResult<()> {
    if !value.is_finite() {
        return Err(MeshError::invalid_parameter(format!(
            "{} must be finite (got {})",
            what, value
        )));
    }
    Ok(())
}

/// A mesh together with one coordinate per global parameter (indexed by the mesh's final ids)
#[derive(Debug, Clone)]
pub struct Surface {
    pub mesh: Mesh,
    pub coords: Coordinates,
    /// Boundary ids exposed for splicing another shape onto this one
    pub connect_points: Option<Vec<usize>>,
}

impl Surface {
    pub fn new(mesh: Mesh, coords: Coordinates) -> Self {
        Self {
            mesh,
            coords,
            connect_points: None,
        }
    }

    /// Split into the mesh, the x, y and z sequences, and the connect points
    pub fn into_parts(self) -> (Mesh, Vec<f64>, Vec<f64>, Vec<f64>, Option<Vec<usize>>) {
        let (x, y, z) = (self.coords.x(), self.coords.y(), self.coords.z());
        (self.mesh, x, y, z, self.connect_points)
    }

    /// Produce a Json Object that describes this Surface
    #[cfg(feature = "json_export")]
    pub fn to_json(&self) -> MeshResult<JsonValue> {
        Ok(object! {
            "mesh": self.mesh.to_json()?,
            "x": self.coords.x(),
            "y": self.coords.y(),
            "z": self.coords.z(),
            "connect_points": self.connect_points.clone(),
        })
    }
}
