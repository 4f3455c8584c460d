use super::patches::{THREE_QUAD_ROWS, TWO_QUAD_ROWS};
use super::rails::{rail_remap, PatchRows, Rails};
use super::{require_elements, require_finite, Composer, Orientation, Surface};
use crate::coords;
use crate::error::{MeshError, MeshResult};
use crate::topology::Mesh;

use tracing::debug;

/// Radii of the 3 rails of a ring, bottom to top
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RailRadii {
    /// The same radius on every rail
    Uniform(f64),
    /// One radius per rail
    PerRail([f64; 3]),
}

impl RailRadii {
    pub fn values(&self) -> [f64; 3] {
        match self {
            Self::Uniform(radius) => [*radius; 3],
            Self::PerRail(radii) => *radii,
        }
    }

    fn validate(&self) -> MeshResult<()> {
        for radius in self.values() {
            if !radius.is_finite() || radius < 0.0 {
                return Err(MeshError::invalid_parameter(format!(
                    "rail radii must be finite and non-negative (got {:?})",
                    self.values()
                )));
            }
        }
        Ok(())
    }
}

impl From<f64> for RailRadii {
    fn from(radius: f64) -> Self {
        Self::Uniform(radius)
    }
}

impl From<[f64; 3]> for RailRadii {
    fn from(radii: [f64; 3]) -> Self {
        Self::PerRail(radii)
    }
}

impl TryFrom<&[f64]> for RailRadii {
    type Error = MeshError;

    /// A single value is broadcast to every rail; three values are assigned bottom to top
    fn try_from(radii: &[f64]) -> Result<Self, Self::Error> {
        match *radii {
            [radius] => Ok(Self::Uniform(radius)),
            [bottom, middle, top] => Ok(Self::PerRail([bottom, middle, top])),
            _ => Err(MeshError::invalid_parameter(format!(
                "ring radii must be a single value or one value per rail (got {} values)",
                radii.len()
            ))),
        }
    }
}

impl Composer {
    /// A closed ring of `count` [two-quad patches](Composer::two_quad_patch)
    ///
    /// The global parameters are numbered rail by rail (bottom, middle, top), with `2 * count` points per rail
    /// running around the ring in the order of its patches.
    pub fn two_quad_ring(&self, count: usize) -> MeshResult<Mesh> {
        self.scoped("two_quad_ring", || self.assemble_two_quad_ring(count))
    }

    /// A [two_quad_ring](Composer::two_quad_ring) of the given `height` with one coordinate per global parameter
    ///
    /// Rail `r` lies at height `r * height / 2` on a circle of radius `radii[r]`, with its points evenly spaced
    /// around the full circle starting on the +x axis.
    pub fn two_quad_ring_surface(
        &self,
        count: usize,
        height: f64,
        radii: impl Into<RailRadii>,
    ) -> MeshResult<Surface> {
        let radii = radii.into();
        self.scoped("two_quad_ring", || {
            self.assemble_two_quad_ring_surface(count, height, radii)
        })
    }

    pub(super) fn assemble_two_quad_ring_surface(
        &self,
        count: usize,
        height: f64,
        radii: RailRadii,
    ) -> MeshResult<Surface> {
        require_finite(height, "ring height")?;
        radii.validate()?;

        let mesh = self.assemble_two_quad_ring(count)?;
        let rails = TWO_QUAD_ROWS.ring_rails(count);
        let coords = coords::cylinder(rails.lens(), height, &radii.values())?;

        Ok(Surface::new(mesh, coords))
    }

    fn assemble_two_quad_ring(&self, count: usize) -> MeshResult<Mesh> {
        require_elements(count, "two quad ring")?;

        let patch = self.two_quad_patch()?;
        let mut ring = self.patch_ring("two_quad_ring", &patch, TWO_QUAD_ROWS, count)?;

        let table = rail_remap(&ring, &TWO_QUAD_ROWS.ring_rails(count), |elem_id, slot| {
            TWO_QUAD_ROWS.ring_position(elem_id, slot)
        })?;
        ring.apply_remap(&table)?;
        Ok(ring)
    }

    /// A closed ring of `count` [three-quad patches](Composer::three_quad_patch)
    ///
    /// The global parameters are numbered rail by rail, on rails of `4 * count`, `3 * count` and `2 * count` points.
    /// A [Downward](Orientation::Downward) ring lists its rails narrowest first and runs around each rail in the
    /// opposite direction, so that it can be stacked below the equator of a sphere.
    pub fn three_quad_ring(&self, count: usize, orientation: Orientation) -> MeshResult<Mesh> {
        self.scoped("three_quad_ring", || {
            self.assemble_three_quad_ring(count, orientation)
        })
    }

    /// An upward [three_quad_ring](Composer::three_quad_ring) of the given `height` and `radius`, with one coordinate
    /// per global parameter
    pub fn three_quad_ring_surface(
        &self,
        count: usize,
        height: f64,
        radius: f64,
    ) -> MeshResult<Surface> {
        self.scoped("three_quad_ring", || {
            require_finite(height, "ring height")?;
            let radii = RailRadii::Uniform(radius);
            radii.validate()?;

            let mesh = self.assemble_three_quad_ring(count, Orientation::Upward)?;
            let rails = THREE_QUAD_ROWS.ring_rails(count);
            let coords = coords::cylinder(rails.lens(), height, &radii.values())?;

            Ok(Surface::new(mesh, coords))
        })
    }

    pub(super) fn assemble_three_quad_ring(
        &self,
        count: usize,
        orientation: Orientation,
    ) -> MeshResult<Mesh> {
        require_elements(count, "three quad ring")?;

        let patch = self.three_quad_patch()?;
        let mut ring = self.patch_ring("three_quad_ring", &patch, THREE_QUAD_ROWS, count)?;

        let rails = THREE_QUAD_ROWS.ring_rails(count);
        let table = match orientation {
            Orientation::Upward => rail_remap(&ring, &rails, |elem_id, slot| {
                THREE_QUAD_ROWS.ring_position(elem_id, slot)
            })?,
            Orientation::Downward => {
                let top = rails.num_rails() - 1;
                rail_remap(&ring, &rails.reversed(), |elem_id, slot| {
                    THREE_QUAD_ROWS
                        .ring_position(elem_id, slot)
                        .map(|(rail, pos)| (top - rail, mirrored(pos, rails.lens()[rail])))
                })?
            }
        };
        ring.apply_remap(&table)?;
        Ok(ring)
    }

    /// Place `count` copies of a finalized patch around a closed loop
    ///
    /// Each copy's trailing edge is identified with the next copy's leading edge (the last copy wraps around to the
    /// first), and an apex shared by all copies becomes a single global parameter. The result is finalized but not
    /// remapped.
    pub(super) fn patch_ring(
        &self,
        name: &str,
        patch: &Mesh,
        rows: PatchRows,
        count: usize,
    ) -> MeshResult<Mesh> {
        let mut ring = Mesh::new(name);
        for _ in 0..count {
            ring.add_element(patch.clone())?;
        }

        for elem_id in 0..count {
            let next = (elem_id + 1) % count;
            for (trailing, leading) in rows.trailing().zip(rows.leading()) {
                self.connect(&mut ring, [(elem_id, trailing), (next, leading)])?;
            }
        }
        if let Some(apex) = rows.apex() {
            self.connect(&mut ring, (0..count).map(|elem_id| (elem_id, apex)))?;
        }

        let num_params = ring.finalize()?;
        debug!(count, num_params, "closed {}", name);
        Ok(ring)
    }
}

/// Position `pos` on a rail of `len` points, counted in the opposite direction from position 0
fn mirrored(pos: usize, len: usize) -> usize {
    (len - pos % len) % len
}

/// Rails of a [three_quad_ring](Composer::three_quad_ring) of `count` patches, bottom to top
pub(super) fn three_quad_ring_rails(count: usize, orientation: Orientation) -> Rails {
    let rails = THREE_QUAD_ROWS.ring_rails(count);
    match orientation {
        Orientation::Upward => rails,
        Orientation::Downward => rails.reversed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::LocalPointRef;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn composer() -> Composer {
        Composer::silent()
    }

    fn global_id(mesh: &Mesh, elem_id: usize, slot: usize) -> usize {
        mesh.global_id(LocalPointRef::new(elem_id, slot)).unwrap()
    }

    #[test]
    fn two_quad_ring_counts() {
        for count in 1..6 {
            let ring = composer().two_quad_ring(count).unwrap();
            assert_eq!(ring.num_elements(), count);
            assert_eq!(ring.num_params(), 9 * count - 3 * count);
            assert_eq!(ring.tri6_point_ids().unwrap().len(), 2 * count);
        }
    }

    #[test]
    fn two_quad_ring_closes() {
        let ring = composer().two_quad_ring(4).unwrap();

        // every patch sits two positions further around each rail than the one before
        for elem_id in 0..4 {
            for row in 0..3 {
                let first = global_id(&ring, elem_id, 3 * row);
                assert_eq!(first, 8 * row + 2 * elem_id);
                assert_eq!(global_id(&ring, elem_id, 3 * row + 1), first + 1);
                assert_eq!(
                    global_id(&ring, elem_id, 3 * row + 2),
                    8 * row + (2 * elem_id + 2) % 8
                );
            }
        }
    }

    #[test]
    fn two_quad_ring_coordinates() {
        let surface = composer().two_quad_ring_surface(4, 1.0, 1.0).unwrap();
        assert_eq!(surface.coords.len(), 24);
        assert_eq!(surface.coords.len(), surface.mesh.num_params());

        for rail in 0..3 {
            for pos in 0..8 {
                let point = surface.coords[8 * rail + pos];
                let angle = 2.0 * PI * pos as f64 / 8.0;
                assert_relative_eq!(point.x, angle.cos(), epsilon = 1e-12);
                assert_relative_eq!(point.y, angle.sin(), epsilon = 1e-12);
                assert_relative_eq!(point.z, 0.5 * rail as f64, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn per_rail_radii() {
        let surface = composer()
            .two_quad_ring_surface(2, 2.0, [1.0, 2.0, 3.0])
            .unwrap();
        let (_, x, _, z, _) = surface.into_parts();
        assert_eq!(x.len(), 12);
        assert_relative_eq!(x[0], 1.0);
        assert_relative_eq!(x[4], 2.0);
        assert_relative_eq!(x[8], 3.0);
        assert_relative_eq!(z[11], 2.0);
    }

    #[test]
    fn radii_from_slices() {
        assert_eq!(
            RailRadii::try_from(&[2.0][..]).unwrap(),
            RailRadii::Uniform(2.0)
        );
        assert_eq!(
            RailRadii::try_from(&[1.0, 2.0, 3.0][..]).unwrap().values(),
            [1.0, 2.0, 3.0]
        );
        assert!(matches!(
            RailRadii::try_from(&[1.0, 2.0][..]),
            Err(MeshError::InvalidParameter(_))
        ));
        assert!(matches!(
            composer().two_quad_ring_surface(3, 1.0, -1.0),
            Err(MeshError::InvalidParameter(_))
        ));
        assert!(matches!(
            composer().two_quad_ring_surface(0, 1.0, 1.0),
            Err(MeshError::InvalidParameter(_))
        ));
    }

    #[test]
    fn three_quad_ring_rail_counts() {
        let ring = composer().three_quad_ring(3, Orientation::Upward).unwrap();
        assert_eq!(ring.num_params(), 12 * 3 - 3 * 3);
        assert_eq!(ring.num_params(), three_quad_ring_rails(3, Orientation::Upward).total());

        // the second patch's bottom row starts 4 points along the bottom rail
        assert_eq!(global_id(&ring, 1, 0), 4);
        assert_eq!(global_id(&ring, 1, 5), 12 + 3);
        assert_eq!(global_id(&ring, 1, 9), 21 + 2);
        // and the last patch wraps back to the start of each rail
        assert_eq!(global_id(&ring, 2, 4), 0);
        assert_eq!(global_id(&ring, 2, 11), 21);
    }

    #[test]
    fn downward_three_quad_ring() {
        let up = composer().three_quad_ring(3, Orientation::Upward).unwrap();
        let down = composer().three_quad_ring(3, Orientation::Downward).unwrap();
        let rails = three_quad_ring_rails(3, Orientation::Downward);
        assert_eq!(rails.lens(), &[6, 9, 12]);

        // the narrow rail comes first, the wide rail last, and every rail runs the other way around
        assert_eq!(global_id(&down, 0, 9), 0);
        assert_eq!(global_id(&down, 0, 10), 5);
        assert_eq!(global_id(&down, 0, 0), 15);
        assert_eq!(global_id(&down, 0, 1), 15 + 11);
        assert_eq!(global_id(&down, 1, 0), 15 + 8);

        // both numberings describe the same triangles
        let table: Vec<usize> = (0..up.num_params())
            .map(|id| {
                let member = up.param(id).unwrap().members()[0];
                down.global_id(member).unwrap()
            })
            .collect();
        let relabeled: Vec<[usize; 6]> = up
            .tri6_point_ids()
            .unwrap()
            .into_iter()
            .map(|tri| tri.map(|id| table[id]))
            .collect();
        assert_eq!(relabeled, down.tri6_point_ids().unwrap());
    }

    #[test]
    fn three_quad_ring_coordinates() {
        let surface = composer().three_quad_ring_surface(2, 3.0, 2.0).unwrap();
        assert_eq!(surface.coords.len(), surface.mesh.num_params());

        // 8 points on the bottom rail, 6 halfway up, 4 on top
        assert_relative_eq!(surface.coords[2].y, 2.0, epsilon = 1e-12);
        assert_relative_eq!(surface.coords[8].z, 1.5);
        assert_relative_eq!(surface.coords[14].z, 3.0);
        assert_relative_eq!(surface.coords[15].y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn mirrored_positions() {
        assert_eq!(mirrored(0, 8), 0);
        assert_eq!(mirrored(1, 8), 7);
        assert_eq!(mirrored(8, 8), 0);
        assert_eq!(mirrored(11, 8), 5);
    }
}
