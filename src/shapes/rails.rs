use crate::error::{MeshError, MeshResult, RemapError};
use crate::topology::{LocalPointRef, Mesh, RemapTable};
use std::ops::Range;

/// The point counts of a mesh's rails, bottom to top.
///
/// A rail-ordered mesh numbers its global parameters rail by rail: ids `0..lens[0]` lie on the first rail, the next
/// `lens[1]` ids on the second, and so on. Rails are closed loops: positions wrap around modulo the rail length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rails {
    lens: Vec<usize>,
}

impl Rails {
    pub fn new(lens: Vec<usize>) -> Self {
        Self { lens }
    }

    pub fn lens(&self) -> &[usize] {
        &self.lens
    }

    pub fn num_rails(&self) -> usize {
        self.lens.len()
    }

    /// Total number of points over all rails
    pub fn total(&self) -> usize {
        self.lens.iter().sum()
    }

    /// Id of the first point on a rail (the total, for a rail past the last one)
    pub fn offset(&self, rail: usize) -> usize {
        self.lens.iter().take(rail).sum()
    }

    /// Ids of all the points on a rail
    pub fn range(&self, rail: usize) -> Option<Range<usize>> {
        let len = *self.lens.get(rail)?;
        let offset = self.offset(rail);
        Some(offset..offset + len)
    }

    /// Ids of the bottom rail
    pub fn bottom(&self) -> Option<Range<usize>> {
        self.range(0)
    }

    /// Ids of the top rail
    pub fn top(&self) -> Option<Range<usize>> {
        self.range(self.lens.len().checked_sub(1)?)
    }

    /// Id of the point at `pos` (modulo the rail length) along `rail`
    ///
    /// Returns `None` if the rail does not exist or has no points.
    pub fn id(&self, rail: usize, pos: usize) -> Option<usize> {
        match self.lens.get(rail) {
            Some(&len) if len > 0 => Some(self.offset(rail) + pos % len),
            _ => None,
        }
    }

    /// The same rails, listed top to bottom
    pub fn reversed(&self) -> Self {
        Self {
            lens: self.lens.iter().rev().copied().collect(),
        }
    }
}

/// Derive a [RemapTable] for a finalized mesh by placing each of its local points on a set of [Rails]
///
/// `locate(elem_id, slot)` gives the `(rail, position)` of a local point. Every member of a global parameter must be
/// placed on the same rail position, and every global parameter must be placed somewhere.
pub fn rail_remap<F>(mesh: &Mesh, rails: &Rails, locate: F) -> MeshResult<RemapTable>
where
    F: Fn(usize, usize) -> Option<(usize, usize)>,
{
    let mut targets: Vec<Option<usize>> = vec![None; mesh.num_params()];

    for (elem_id, element) in mesh.elements().enumerate() {
        for slot in 0..element.num_points() {
            if let Some((rail, pos)) = locate(elem_id, slot) {
                let source = mesh.global_id(LocalPointRef::new(elem_id, slot))?;
                let target = rails.id(rail, pos).ok_or_else(|| {
                    MeshError::invalid_parameter(format!(
                        "point ({}, {}) was placed at position {} of rail {}, which has no points",
                        elem_id, slot, pos, rail
                    ))
                })?;

                match targets[source] {
                    Some(first) if first != target => {
                        return Err(RemapError::Conflict {
                            source_id: source,
                            first,
                            second: target,
                        }
                        .into())
                    }
                    _ => targets[source] = Some(target),
                }
            }
        }
    }

    Ok(RemapTable::from_partial(targets)?)
}

/// The row structure of a fixed patch, in its remapped numbering.
///
/// Row `r` holds `widths[r]` consecutive ids, left to right; rows are listed bottom to top. A final row of width 1
/// is the patch's apex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchRows {
    widths: &'static [usize],
}

impl PatchRows {
    pub const fn new(widths: &'static [usize]) -> Self {
        Self { widths }
    }

    pub fn num_points(&self) -> usize {
        self.widths.iter().sum()
    }

    /// Get the `(row, column)` of a patch id
    pub fn locate(&self, id: usize) -> Option<(usize, usize)> {
        let mut first = 0;
        for (row, width) in self.widths.iter().enumerate() {
            if id < first + width {
                return Some((row, id - first));
            }
            first += width;
        }
        None
    }

    /// Id of the apex, if the patch has one
    pub fn apex(&self) -> Option<usize> {
        match self.widths.last() {
            Some(1) => Some(self.num_points() - 1),
            _ => None,
        }
    }

    fn sides(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.widths
            .iter()
            .scan(0, |first, width| {
                let side = (*first, *first + width - 1);
                *first += width;
                Some((side, *width))
            })
            .filter(|(_, width)| *width > 1)
            .map(|(side, _)| side)
    }

    /// Ids on the patch's left edge (the first id of each row, excluding the apex)
    pub fn leading(&self) -> impl Iterator<Item = usize> + '_ {
        self.sides().map(|(first, _)| first)
    }

    /// Ids on the patch's right edge (the last id of each row, excluding the apex)
    pub fn trailing(&self) -> impl Iterator<Item = usize> + '_ {
        self.sides().map(|(_, last)| last)
    }

    /// Rails formed by `count` copies of this patch placed side by side around a closed loop
    ///
    /// Each copy adds `width - 1` new points to a row's rail, since its first column is shared with the previous copy.
    /// An apex row is shared by all copies.
    pub fn ring_rails(&self, count: usize) -> Rails {
        Rails::new(
            self.widths
                .iter()
                .map(|&width| match width {
                    1 => 1,
                    w => (w - 1) * count,
                })
                .collect(),
        )
    }

    /// The `(rail, position)` of a point of the `copy`-th patch around a loop (see [PatchRows::ring_rails])
    pub fn ring_position(&self, copy: usize, id: usize) -> Option<(usize, usize)> {
        let (row, col) = self.locate(id)?;
        match self.widths[row] {
            1 => Some((row, 0)),
            w => Some((row, copy * (w - 1) + col)),
        }
    }
}
