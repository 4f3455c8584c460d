use super::patches::FOUR_TRI_ROWS;
use super::rails::{rail_remap, Rails};
use super::{require_elements, Composer, Orientation, Surface};
use crate::coords;
use crate::error::{MeshError, MeshResult};
use crate::topology::Mesh;

use tracing::debug;

impl Composer {
    /// A fan of `count` triangles around a shared apex, closed into a dome.
    ///
    /// Upward, the global parameters run around the rim (`2 * count` points), then around the ring of midpoints
    /// between the rim and the apex (`count` points), and the apex comes last. [Downward](Orientation::Downward)
    /// lists the same rails in the opposite order, starting at the apex, for the bottom cap of a sphere.
    pub fn tri_hemisphere(&self, count: usize, orientation: Orientation) -> MeshResult<Mesh> {
        self.scoped("tri_hemisphere", || {
            self.assemble_tri_hemisphere(count, orientation)
        })
    }

    /// An upward [tri_hemisphere](Composer::tri_hemisphere) over a dome of the given `radius`
    ///
    /// The rim lies on the equator, the middle rail at an elevation of 45 degrees, and the apex on the +z axis.
    pub fn tri_hemisphere_surface(&self, count: usize, radius: f64) -> MeshResult<Surface> {
        self.scoped("tri_hemisphere", || {
            require_radius(radius)?;
            let mesh = self.assemble_tri_hemisphere(count, Orientation::Upward)?;
            let coords = coords::dome(tri_hemisphere_rails(count, Orientation::Upward).lens(), radius);
            Ok(Surface::new(mesh, coords))
        })
    }

    pub(super) fn assemble_tri_hemisphere(
        &self,
        count: usize,
        orientation: Orientation,
    ) -> MeshResult<Mesh> {
        require_elements(count, "triangle hemisphere")?;

        let mut hemi = Mesh::new("tri_hemisphere");
        hemi.create_elements(count)?;

        self.connect(&mut hemi, (0..count).map(|elem_id| (elem_id, 4)))?;
        for elem_id in 0..count {
            let next = (elem_id + 1) % count;
            self.connect(&mut hemi, [(elem_id, 3), (next, 5)])?;
            self.connect(&mut hemi, [(elem_id, 2), (next, 0)])?;
        }

        let num_params = hemi.finalize()?;
        debug!(count, num_params, "closed fan");

        let rails = tri_hemisphere_rails(count, orientation);
        let table = match orientation {
            Orientation::Upward => rail_remap(&hemi, &rails, fan_position)?,
            Orientation::Downward => rail_remap(&hemi, &rails, |elem_id, slot| {
                fan_position(elem_id, slot).map(|(rail, pos)| (2 - rail, pos))
            })?,
        };
        hemi.apply_remap(&table)?;
        Ok(hemi)
    }

    /// A dome built from `count` [four-triangle patches](Composer::four_tri_patch) sharing their apex.
    ///
    /// The global parameters are numbered rail by rail from the rim up: `4 * count`, `3 * count`, `2 * count` and
    /// `count` points, then the apex.
    pub fn four_tri_patch_hemisphere(&self, count: usize) -> MeshResult<Mesh> {
        self.scoped("four_tri_patch_hemisphere", || {
            self.assemble_four_tri_patch_hemisphere(count)
        })
    }

    /// A [four_tri_patch_hemisphere](Composer::four_tri_patch_hemisphere) over a dome of the given `radius`, with its
    /// five rails at evenly spaced elevations
    pub fn four_tri_patch_hemisphere_surface(&self, count: usize, radius: f64) -> MeshResult<Surface> {
        self.scoped("four_tri_patch_hemisphere", || {
            require_radius(radius)?;
            let mesh = self.assemble_four_tri_patch_hemisphere(count)?;
            let coords = coords::dome(FOUR_TRI_ROWS.ring_rails(count).lens(), radius);
            Ok(Surface::new(mesh, coords))
        })
    }

    fn assemble_four_tri_patch_hemisphere(&self, count: usize) -> MeshResult<Mesh> {
        require_elements(count, "patch hemisphere")?;

        let patch = self.four_tri_patch()?;
        let mut hemi =
            self.patch_ring("four_tri_patch_hemisphere", &patch, FOUR_TRI_ROWS, count)?;

        let table = rail_remap(&hemi, &FOUR_TRI_ROWS.ring_rails(count), |elem_id, slot| {
            FOUR_TRI_ROWS.ring_position(elem_id, slot)
        })?;
        hemi.apply_remap(&table)?;
        Ok(hemi)
    }
}

/// Rails of a [tri_hemisphere](Composer::tri_hemisphere) of `count` triangles, in numbering order
pub(super) fn tri_hemisphere_rails(count: usize, orientation: Orientation) -> Rails {
    let rails = Rails::new(vec![2 * count, count, 1]);
    match orientation {
        Orientation::Upward => rails,
        Orientation::Downward => rails.reversed(),
    }
}

/// Upward rail position of a local point on a fan of triangles
fn fan_position(elem_id: usize, slot: usize) -> Option<(usize, usize)> {
    match slot {
        0 => Some((0, 2 * elem_id)),
        1 => Some((0, 2 * elem_id + 1)),
        2 => Some((0, 2 * elem_id + 2)),
        3 => Some((1, elem_id + 1)),
        4 => Some((2, 0)),
        5 => Some((1, elem_id)),
        _ => None,
    }
}

fn require_radius(radius: f64) -> MeshResult<()> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(MeshError::invalid_parameter(format!(
            "a hemisphere radius must be finite and non-negative (got {})",
            radius
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::LocalPointRef;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    fn composer() -> Composer {
        Composer::silent()
    }

    fn global_id(mesh: &Mesh, elem_id: usize, slot: usize) -> usize {
        mesh.global_id(LocalPointRef::new(elem_id, slot)).unwrap()
    }

    #[test]
    fn apex_is_one_class() {
        let hemi = composer().tri_hemisphere(4, Orientation::Upward).unwrap();
        assert_eq!(hemi.num_params(), 13);

        let apex = hemi.param(12).unwrap();
        assert_eq!(apex.len(), 4);
        for (elem_id, member) in apex.members().iter().enumerate() {
            assert_eq!(*member, LocalPointRef::new(elem_id, 4));
        }
    }

    #[test]
    fn zero_radius_fan() {
        let surface = composer().tri_hemisphere_surface(4, 0.0).unwrap();
        assert_eq!(surface.mesh.param(12).unwrap().len(), 4);
        assert!(surface
            .coords
            .points()
            .iter()
            .all(|point| point.coords.norm() == 0.0));
    }

    #[test]
    fn upward_rails() {
        let hemi = composer().tri_hemisphere(4, Orientation::Upward).unwrap();

        assert_eq!(global_id(&hemi, 1, 0), 2);
        assert_eq!(global_id(&hemi, 1, 1), 3);
        assert_eq!(global_id(&hemi, 1, 5), 8 + 1);
        assert_eq!(global_id(&hemi, 1, 3), 8 + 2);
        // the last triangle closes the fan
        assert_eq!(global_id(&hemi, 3, 2), 0);
        assert_eq!(global_id(&hemi, 3, 3), 8);
    }

    #[test]
    fn downward_rails() {
        let hemi = composer().tri_hemisphere(4, Orientation::Downward).unwrap();
        assert_eq!(
            tri_hemisphere_rails(4, Orientation::Downward).lens(),
            &[1, 4, 8]
        );

        assert_eq!(hemi.param(0).unwrap().len(), 4);
        assert_eq!(global_id(&hemi, 0, 4), 0);
        assert_eq!(global_id(&hemi, 2, 5), 1 + 2);
        assert_eq!(global_id(&hemi, 2, 0), 5 + 4);
        assert_eq!(global_id(&hemi, 3, 2), 5);
    }

    #[test]
    fn single_triangle_fan() {
        let hemi = composer().tri_hemisphere(1, Orientation::Upward).unwrap();
        assert_eq!(hemi.num_params(), 4);
        assert!(matches!(
            composer().tri_hemisphere(0, Orientation::Upward),
            Err(MeshError::InvalidParameter(_))
        ));
    }

    #[test]
    fn dome_coordinates() {
        let surface = composer().tri_hemisphere_surface(3, 2.0).unwrap();
        assert_eq!(surface.coords.len(), surface.mesh.num_params());

        for point in surface.coords.points()[..6].iter() {
            assert_relative_eq!(point.z, 0.0);
        }
        for point in surface.coords.points()[6..9].iter() {
            assert_relative_eq!(point.z, 2.0 * FRAC_PI_4.sin(), epsilon = 1e-12);
        }
        assert_relative_eq!(surface.coords[9].z, 2.0);

        // a rim midpoint sits halfway around the rim between its triangle's corners
        let hemi = &surface.mesh;
        let (a, mid, b) = (
            surface.coords[global_id(hemi, 1, 0)],
            surface.coords[global_id(hemi, 1, 1)],
            surface.coords[global_id(hemi, 1, 2)],
        );
        let halfway = (a.coords + b.coords).normalize() * 2.0;
        assert_relative_eq!(mid.coords, halfway, epsilon = 1e-12);
    }

    #[test]
    fn patch_hemisphere() {
        let hemi = composer().four_tri_patch_hemisphere(3).unwrap();
        assert_eq!(hemi.num_params(), 10 * 3 + 1);
        assert_eq!(hemi.tri6_point_ids().unwrap().len(), 12);

        let apex = hemi.param(30).unwrap();
        assert_eq!(apex.len(), 3);
        assert_eq!(global_id(&hemi, 0, 14), 30);

        // the second patch starts one quarter of the way around each rail
        assert_eq!(global_id(&hemi, 1, 0), 4);
        assert_eq!(global_id(&hemi, 1, 5), 12 + 3);
        assert_eq!(global_id(&hemi, 1, 9), 21 + 2);
        assert_eq!(global_id(&hemi, 1, 12), 27 + 1);
        assert_eq!(global_id(&hemi, 2, 13), 27);
    }

    #[test]
    fn patch_hemisphere_coordinates() {
        let surface = composer().four_tri_patch_hemisphere_surface(2, 1.0).unwrap();
        assert_eq!(surface.coords.len(), 21);
        assert_eq!(surface.coords.len(), surface.mesh.num_params());
        assert_relative_eq!(surface.coords[20].z, 1.0);
        assert!(matches!(
            composer().four_tri_patch_hemisphere_surface(2, f64::NAN),
            Err(MeshError::InvalidParameter(_))
        ));
    }
}
