use super::rails::{rail_remap, PatchRows, Rails};
use super::{require_elements, Composer};
use crate::error::MeshResult;
use crate::topology::{Mesh, RemapTable};

use tracing::debug;

/// Row layout of [Composer::two_quad_patch]
pub const TWO_QUAD_ROWS: PatchRows = PatchRows::new(&[3, 3, 3]);
/// Row layout of [Composer::three_quad_patch]
pub const THREE_QUAD_ROWS: PatchRows = PatchRows::new(&[5, 4, 3]);
/// Row layout of [Composer::four_tri_patch]
pub const FOUR_TRI_ROWS: PatchRows = PatchRows::new(&[5, 4, 3, 2, 1]);
/// Row layout of [Composer::eight_tri_patch]
pub const EIGHT_TRI_ROWS: PatchRows = PatchRows::new(&[7, 6, 5, 4, 3]);

/// A fixed patch: its identification calls and the table which puts its canonical ids into row order
struct Recipe {
    name: &'static str,
    num_elements: usize,
    stitches: &'static [&'static [(usize, usize)]],
    table: &'static [(usize, usize)],
}

const TWO_QUAD: Recipe = Recipe {
    name: "two_quad_patch",
    num_elements: 2,
    stitches: &[&[(0, 2), (1, 4)], &[(0, 3), (1, 3)], &[(0, 4), (1, 2)]],
    table: &[
        (0, 0),
        (1, 1),
        (2, 2),
        (3, 4),
        (4, 6),
        (5, 3),
        (6, 8),
        (7, 7),
        (8, 5),
    ],
};

const THREE_QUAD: Recipe = Recipe {
    name: "three_quad_patch",
    num_elements: 3,
    stitches: &[
        &[(0, 2), (1, 0), (2, 0)],
        &[(0, 3), (1, 5)],
        &[(0, 4), (1, 4)],
        &[(1, 1), (2, 5)],
        &[(1, 2), (2, 4)],
    ],
    table: &[
        (0, 0),
        (1, 1),
        (2, 2),
        (3, 6),
        (4, 9),
        (5, 5),
        (6, 7),
        (7, 11),
        (8, 10),
        (9, 3),
        (10, 4),
        (11, 8),
    ],
};

const FOUR_TRI: Recipe = Recipe {
    name: "four_tri_patch",
    num_elements: 4,
    stitches: &[
        &[(0, 2), (1, 0), (2, 0)],
        &[(0, 4), (1, 4), (3, 0)],
        &[(1, 2), (2, 4), (3, 2)],
        &[(0, 3), (1, 5)],
        &[(1, 1), (2, 5)],
        &[(1, 3), (3, 1)],
    ],
    table: &[
        (0, 0),
        (1, 1),
        (2, 2),
        (3, 6),
        (4, 9),
        (5, 5),
        (6, 7),
        (7, 11),
        (8, 10),
        (9, 3),
        (10, 4),
        (11, 8),
        (12, 13),
        (13, 14),
        (14, 12),
    ],
};

const EIGHT_TRI: Recipe = Recipe {
    name: "eight_tri_patch",
    num_elements: 8,
    stitches: &[
        // bottom row
        &[(0, 2), (1, 0), (2, 0)],
        &[(2, 2), (3, 0), (4, 0)],
        &[(0, 3), (1, 5)],
        &[(1, 1), (2, 5)],
        &[(2, 3), (3, 5)],
        &[(3, 1), (4, 5)],
        // between rows
        &[(0, 4), (1, 4), (5, 0)],
        &[(1, 3), (5, 1)],
        &[(1, 2), (2, 4), (3, 4), (5, 2), (6, 0), (7, 0)],
        &[(3, 3), (7, 1)],
        &[(3, 2), (4, 4), (7, 2)],
        // top row
        &[(5, 3), (6, 5)],
        &[(6, 1), (7, 5)],
        &[(5, 4), (6, 4)],
        &[(6, 2), (7, 4)],
    ],
    table: &[
        (0, 0),
        (1, 1),
        (2, 2),
        (3, 8),
        (4, 13),
        (5, 7),
        (6, 9),
        (7, 15),
        (8, 14),
        (9, 3),
        (10, 4),
        (11, 10),
        (12, 11),
        (13, 17),
        (14, 16),
        (15, 5),
        (16, 6),
        (17, 12),
        (18, 19),
        (19, 22),
        (20, 18),
        (21, 20),
        (22, 24),
        (23, 23),
        (24, 21),
    ],
};

impl Composer {
    /// A square built from two triangles sharing their diagonal edge.
    ///
    /// 9 global parameters in 3 rows of 3 (see [TWO_QUAD_ROWS]):
    /// ```text
    /// 6 - 7 - 8
    /// | \     |
    /// 3   4   5
    /// |     \ |
    /// 0 - 1 - 2
    /// ```
    pub fn two_quad_patch(&self) -> MeshResult<Mesh> {
        self.scoped(TWO_QUAD.name, || self.literal_patch(&TWO_QUAD))
    }

    /// A quadrilateral built from three triangles: 12 global parameters in rows of 5, 4 and 3 (see [THREE_QUAD_ROWS])
    pub fn three_quad_patch(&self) -> MeshResult<Mesh> {
        self.scoped(THREE_QUAD.name, || self.literal_patch(&THREE_QUAD))
    }

    /// A large triangle subdivided into four: 15 global parameters in rows of 5, 4, 3, 2 and 1 (see [FOUR_TRI_ROWS])
    pub fn four_tri_patch(&self) -> MeshResult<Mesh> {
        self.scoped(FOUR_TRI.name, || self.literal_patch(&FOUR_TRI))
    }

    /// A trapezoid built from two strips of triangles (five below, three above): 25 global parameters in rows of
    /// 7, 6, 5, 4 and 3 (see [EIGHT_TRI_ROWS])
    pub fn eight_tri_patch(&self) -> MeshResult<Mesh> {
        self.scoped(EIGHT_TRI.name, || self.literal_patch(&EIGHT_TRI))
    }

    fn literal_patch(&self, recipe: &Recipe) -> MeshResult<Mesh> {
        let mut mesh = Mesh::new(recipe.name);
        mesh.create_elements(recipe.num_elements)?;
        for stitch in recipe.stitches {
            self.connect(&mut mesh, stitch.iter().copied())?;
        }

        let num_params = mesh.finalize()?;
        debug!(num_params, "finalized");

        mesh.apply_remap(&RemapTable::from_pairs(recipe.table.iter().copied())?)?;
        Ok(mesh)
    }

    /// A strip of `num_elements` triangles, alternately upright and inverted, running left to right.
    ///
    /// The global parameters are numbered along three rails: the bottom row, the row of edge midpoints, then the top
    /// row. A strip of 3 triangles has the same layout as [Composer::three_quad_patch].
    pub fn triangular_strip(&self, num_elements: usize) -> MeshResult<Mesh> {
        self.scoped("triangular_strip", || {
            require_elements(num_elements, "triangular strip")?;
            let mut mesh = Mesh::new("triangular_strip");
            mesh.create_elements(num_elements)?;

            for (i, j) in (0..num_elements).zip(1..num_elements) {
                let stitches = if i % 2 == 0 {
                    [[(i, 2), (j, 0)], [(i, 3), (j, 5)], [(i, 4), (j, 4)]]
                } else {
                    [[(i, 1), (j, 5)], [(i, 2), (j, 4)], [(i, 0), (j, 0)]]
                };
                for stitch in stitches {
                    self.connect(&mut mesh, stitch)?;
                }
            }

            let num_params = mesh.finalize()?;
            debug!(num_params, "finalized");

            let table = rail_remap(&mesh, &strip_rails(num_elements), strip_position)?;
            mesh.apply_remap(&table)?;
            Ok(mesh)
        })
    }
}

/// The bottom, middle and top rails of a strip of `n` triangles
pub(crate) fn strip_rails(n: usize) -> Rails {
    if n % 2 == 1 {
        Rails::new(vec![n + 2, n + 1, n])
    } else {
        Rails::new(vec![n + 1, n + 1, n + 1])
    }
}

/// Rail position of a local point on a strip
///
/// Even triangles stand upright on the bottom rail; odd triangles hang from the top rail.
fn strip_position(elem_id: usize, slot: usize) -> Option<(usize, usize)> {
    let i = elem_id;
    if i % 2 == 0 {
        match slot {
            0 => Some((0, i)),
            1 => Some((0, i + 1)),
            2 => Some((0, i + 2)),
            3 => Some((1, i + 1)),
            4 => Some((2, i)),
            5 => Some((1, i)),
            _ => None,
        }
    } else {
        match slot {
            0 => Some((0, i + 1)),
            1 => Some((1, i + 1)),
            2 => Some((2, i + 1)),
            3 => Some((2, i)),
            4 => Some((2, i - 1)),
            5 => Some((1, i)),
            _ => None,
        }
    }
}
