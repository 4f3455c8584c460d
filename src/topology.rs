/// Quadratic triangles and compound (sub-mesh) elements
pub mod element;
/// Bijective renumbering of global parameters
pub mod remap;

pub use element::{Element, LocalPointRef};
pub use remap::RemapTable;

use crate::error::{MeshError, MeshResult};

#[cfg(feature = "json_export")]
use json::{object, JsonValue};
use smallvec::SmallVec;
use std::fmt;
use std::ops::Range;

/// Number of local points on a quadratic triangle
pub const TRI6_POINTS: usize = 6;

/// The connectivity graph of a collection of Elements.
///
/// Each Element contributes a fixed number of local points. Connection calls identify local points with one another
/// (transitively), and [`Mesh::finalize`] assigns one canonical id to each resulting equivalence class:
/// * Elements are visited in creation order, and their slots in slot order
/// * Each class receives the next unused id the first time one of its members is visited
///
/// A single [`RemapTable`] can then be applied to move from the canonical order to a geometric order.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    elements: Vec<Element>,
    /// index of each Element's first slot among all local points
    offsets: Vec<usize>,
    /// union-find forest over all local points
    parents: Vec<usize>,
    class_sizes: Vec<usize>,
    /// global id of each local point (empty until finalized)
    point_ids: Vec<usize>,
    params: Vec<GlobalParameter>,
    state: NumberingState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberingState {
    Open,
    Canonical,
    Remapped,
}

impl Mesh {
    /// Construct an empty Mesh
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
            offsets: Vec::new(),
            parents: Vec::new(),
            class_sizes: Vec::new(),
            point_ids: Vec::new(),
            params: Vec::new(),
            state: NumberingState::Open,
        }
    }

    // ----------------------------------------------------------------------------------------------------
    // Construction
    // ----------------------------------------------------------------------------------------------------

    /// Append `count` quadratic triangles, each with 6 unconnected local points
    ///
    /// Returns the range of new Element ids
    pub fn create_elements(&mut self, count: usize) -> MeshResult<Range<usize>> {
        self.require_open()?;
        let first = self.elements.len();
        for _ in 0..count {
            self.push_element(Element::Tri6);
        }
        Ok(first..self.elements.len())
    }

    /// Import a finalized Mesh as a single compound Element
    ///
    /// The sub-mesh's global parameter ids become the local slots of the new Element. Returns the Element's id.
    pub fn add_element(&mut self, sub_mesh: Mesh) -> MeshResult<usize> {
        self.require_open()?;
        if !sub_mesh.is_finalized() {
            return Err(MeshError::UnfinalizedSubMesh(sub_mesh.name));
        }

        let elem_id = self.elements.len();
        self.push_element(Element::Compound(Box::new(sub_mesh)));
        Ok(elem_id)
    }

    fn push_element(&mut self, element: Element) {
        let offset = self.parents.len();
        let num_points = element.num_points();

        self.offsets.push(offset);
        self.parents.extend(offset..offset + num_points);
        self.class_sizes.extend(std::iter::repeat(1).take(num_points));
        self.elements.push(element);
    }

    /// Identify a group of local points as the same global parameter
    ///
    /// The classes containing each of the points are merged into one. All references are checked before anything
    /// is merged, so a failed call leaves the Mesh unchanged.
    pub fn connect_points<I>(&mut self, refs: I) -> MeshResult<()>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        self.require_open()?;
        let flat: SmallVec<[usize; 8]> = refs
            .into_iter()
            .map(|(elem_id, slot)| self.flat_index(LocalPointRef::new(elem_id, slot)))
            .collect::<MeshResult<_>>()?;

        if let Some((first, rest)) = flat.split_first() {
            for other in rest {
                self.union(*first, *other);
            }
        }

        Ok(())
    }

    fn find(&mut self, mut point: usize) -> usize {
        while self.parents[point] != point {
            self.parents[point] = self.parents[self.parents[point]];
            point = self.parents[point];
        }
        point
    }

    fn union(&mut self, a: usize, b: usize) {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a == root_b {
            return;
        }

        let (big, small) = if self.class_sizes[root_a] >= self.class_sizes[root_b] {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        self.parents[small] = big;
        self.class_sizes[big] += self.class_sizes[small];
    }

    /// Freeze the topology and assign canonical global parameter ids
    ///
    /// Returns the number of global parameters. Can only be called once.
    pub fn finalize(&mut self) -> MeshResult<usize> {
        self.require_open()?;

        let mut root_ids: Vec<Option<usize>> = vec![None; self.parents.len()];
        let mut id_tracker = IdTracker::new(0);
        let mut point_ids = Vec::with_capacity(self.parents.len());
        let mut params: Vec<GlobalParameter> = Vec::new();

        for elem_id in 0..self.elements.len() {
            for slot in 0..self.elements[elem_id].num_points() {
                let root = self.find(self.offsets[elem_id] + slot);
                let id = *root_ids[root].get_or_insert_with(|| id_tracker.next_id());
                if id == params.len() {
                    params.push(GlobalParameter::new(id));
                }

                params[id].members.push(LocalPointRef::new(elem_id, slot));
                point_ids.push(id);
            }
        }

        self.point_ids = point_ids;
        self.params = params;
        self.state = NumberingState::Canonical;

        Ok(self.params.len())
    }

    /// Renumber every global parameter according to a bijective [RemapTable]
    ///
    /// Requires a finalized Mesh. The table is checked against the parameter count before anything is changed,
    /// and a Mesh can only be remapped once. All subsequent lookups use the new ids.
    pub fn apply_remap(&mut self, table: &RemapTable) -> MeshResult<()> {
        match self.state {
            NumberingState::Open => return Err(MeshError::NotFinalized(self.name.clone())),
            NumberingState::Remapped => return Err(MeshError::AlreadyRemapped(self.name.clone())),
            NumberingState::Canonical => table.validate(self.params.len())?,
        }

        for id in self.point_ids.iter_mut() {
            *id = table.target(*id);
        }
        for param in self.params.iter_mut() {
            param.id = table.target(param.id);
        }
        self.params.sort_unstable_by_key(|param| param.id);
        self.state = NumberingState::Remapped;

        Ok(())
    }

    // ----------------------------------------------------------------------------------------------------
    // Data Retrieval
    // ----------------------------------------------------------------------------------------------------

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    /// Total number of local points over all Elements (before any identification)
    pub fn num_local_points(&self) -> usize {
        self.parents.len()
    }

    /// Number of global parameters (zero until the Mesh is finalized)
    pub fn num_params(&self) -> usize {
        self.params.len()
    }

    pub fn is_finalized(&self) -> bool {
        self.state != NumberingState::Open
    }

    pub fn is_remapped(&self) -> bool {
        self.state == NumberingState::Remapped
    }

    /// Iterate over all Elements in creation order
    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.elements.iter()
    }

    pub fn element(&self, elem_id: usize) -> Option<&Element> {
        self.elements.get(elem_id)
    }

    /// Global parameters, indexed by their current id
    pub fn params(&self) -> &[GlobalParameter] {
        &self.params
    }

    pub fn param(&self, id: usize) -> Option<&GlobalParameter> {
        self.params.get(id)
    }

    /// Get the current global parameter id of a local point
    pub fn global_id(&self, point: LocalPointRef) -> MeshResult<usize> {
        let flat = self.flat_index(point)?;
        self.require_numbering()?;
        Ok(self.point_ids[flat])
    }

    /// Get the global ids of all 6 points of every quadratic triangle in the Mesh
    ///
    /// Compound Elements are resolved recursively, so the result covers every leaf triangle (in creation order),
    /// expressed in this Mesh's current numbering.
    pub fn tri6_point_ids(&self) -> MeshResult<Vec<[usize; TRI6_POINTS]>> {
        self.require_numbering()?;

        let mut triangles = Vec::new();
        for (element, offset) in self.elements.iter().zip(self.offsets.iter()) {
            match element {
                Element::Tri6 => {
                    triangles.push(std::array::from_fn(|slot| self.point_ids[offset + slot]))
                }
                Element::Compound(sub_mesh) => triangles.extend(
                    sub_mesh
                        .tri6_point_ids()?
                        .into_iter()
                        .map(|tri| tri.map(|sub_id| self.point_ids[offset + sub_id])),
                ),
            }
        }

        Ok(triangles)
    }

    fn flat_index(&self, point: LocalPointRef) -> MeshResult<usize> {
        let invalid = |num_slots| MeshError::InvalidReference {
            elem_id: point.elem_id,
            slot: point.slot,
            num_elements: self.elements.len(),
            num_slots,
        };

        match self.elements.get(point.elem_id) {
            None => Err(invalid(0)),
            Some(element) if point.slot >= element.num_points() => {
                Err(invalid(element.num_points()))
            }
            Some(_) => Ok(self.offsets[point.elem_id] + point.slot),
        }
    }

    fn require_open(&self) -> MeshResult<()> {
        match self.state {
            NumberingState::Open => Ok(()),
            _ => Err(MeshError::AlreadyFinalized(self.name.clone())),
        }
    }

    fn require_numbering(&self) -> MeshResult<()> {
        match self.state {
            NumberingState::Open => Err(MeshError::NotFinalized(self.name.clone())),
            _ => Ok(()),
        }
    }

    /// Produce a Json Object that describes this Mesh
    #[cfg(feature = "json_export")]
    pub fn to_json(&self) -> MeshResult<JsonValue> {
        let triangles: Vec<JsonValue> = self
            .tri6_point_ids()?
            .iter()
            .map(|tri| JsonValue::from(tri.to_vec()))
            .collect();

        Ok(object! {
            "name": self.name.clone(),
            "num_params": self.num_params(),
            "remapped": self.is_remapped(),
            "triangles": JsonValue::from(triangles),
            "params": JsonValue::from(self.params.iter().map(|param| param.to_json()).collect::<Vec<_>>()),
        })
    }
}

/// An equivalence class of identified local points, addressed by one global id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalParameter {
    pub id: usize,
    members: SmallVec<[LocalPointRef; 4]>,
}

impl GlobalParameter {
    fn new(id: usize) -> Self {
        Self {
            id,
            members: SmallVec::new(),
        }
    }

    /// The local points in this class, in traversal order
    pub fn members(&self) -> &[LocalPointRef] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Produce a Json Object that describes this GlobalParameter
    #[cfg(feature = "json_export")]
    pub fn to_json(&self) -> JsonValue {
        object! {
            "id": self.id,
            "members": JsonValue::from(
                self.members
                    .iter()
                    .map(|m| JsonValue::from(vec![m.elem_id, m.slot]))
                    .collect::<Vec<_>>()
            ),
        }
    }
}

impl fmt::Display for GlobalParameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "GlobalParameter {} \t [", self.id)?;
        for member in self.members.iter() {
            write!(f, " {}", member)?;
        }
        write!(f, " ]")
    }
}

struct IdTracker {
    next_id: usize,
}

impl IdTracker {
    pub fn new(start: usize) -> Self {
        Self { next_id: start }
    }

    pub fn next_id(&mut self) -> usize {
        self.next_id += 1;
        self.next_id - 1
    }
}
