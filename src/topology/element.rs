use super::{Mesh, TRI6_POINTS};
use std::fmt;

/// The `Element`s are the basic topological unit of a [`Mesh`].
///
/// An Element is either a single quadratic triangle, or an entire finalized Mesh embedded as one compound element.
/// In the compound case, the element's local slots are the sub-mesh's global parameter ids (in its final numbering).
///
/// ## Layout
/// The local slots of a [`Element::Tri6`] run counter-clockwise from the first vertex, alternating vertex and edge points:
///
/// ```text
///            4
///           / \
///          5   3
///         /     \
///        0---1---2
/// ```
#[derive(Debug, Clone)]
pub enum Element {
    /// A 6-point quadratic triangle
    Tri6,
    /// A fully built sub-mesh
    Compound(Box<Mesh>),
}

impl Element {
    /// Number of local point slots on this Element
    pub fn num_points(&self) -> usize {
        match self {
            Self::Tri6 => TRI6_POINTS,
            Self::Compound(sub_mesh) => sub_mesh.num_params(),
        }
    }

    /// Get the embedded sub-mesh, if this is a compound element
    pub fn sub_mesh(&self) -> Option<&Mesh> {
        match self {
            Self::Tri6 => None,
            Self::Compound(sub_mesh) => Some(sub_mesh),
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, Self::Compound(_))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Tri6 => write!(f, "Tri6"),
            Self::Compound(sub_mesh) => write!(
                f,
                "Compound['{}': {} points]",
                sub_mesh.name,
                sub_mesh.num_params()
            ),
        }
    }
}

/// The address of one local point: an Element and one of its slots
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalPointRef {
    pub elem_id: usize,
    pub slot: usize,
}

impl LocalPointRef {
    pub const fn new(elem_id: usize, slot: usize) -> Self {
        Self { elem_id, slot }
    }
}

impl From<(usize, usize)> for LocalPointRef {
    fn from((elem_id, slot): (usize, usize)) -> Self {
        Self::new(elem_id, slot)
    }
}

impl fmt::Display for LocalPointRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.elem_id, self.slot)
    }
}
