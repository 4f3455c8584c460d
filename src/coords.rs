//! Coordinate synthesis for rail-ordered meshes.
//!
//! Every builder in [`shapes`](crate::shapes) numbers its global parameters rail by rail: all points on the first
//! rail (evenly spaced around a full circle), then the next rail, and so on. The functions here produce one
//! coordinate per point in exactly that order, so coordinate index `i` belongs to global parameter `i`.

use crate::error::{MeshError, MeshResult};

use nalgebra::Point3;
use std::f64::consts::{FRAC_PI_2, PI};
use std::ops::{Index, Range};

/// (x, y, z) coordinates indexed by global parameter id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coordinates {
    points: Vec<Point3<f64>>,
}

impl Coordinates {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, point: Point3<f64>) {
        self.points.push(point);
    }

    /// Append all of `other`'s points after this set's points
    pub fn append(&mut self, mut other: Coordinates) {
        self.points.append(&mut other.points);
    }

    /// Keep only the first `len` points
    pub fn truncate(&mut self, len: usize) {
        self.points.truncate(len);
    }

    /// Shift the z-coordinate of a contiguous block of points
    pub fn translate_z(&mut self, ids: Range<usize>, dz: f64) -> MeshResult<()> {
        let len = self.points.len();
        let block = self.points.get_mut(ids.clone()).ok_or_else(|| {
            MeshError::invalid_parameter(format!(
                "cannot translate points {:?} of a set of {} coordinates",
                ids, len
            ))
        })?;

        for point in block.iter_mut() {
            point.z += dz;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Point3<f64>> {
        self.points.get(id)
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// The x-sequence
    pub fn x(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    /// The y-sequence
    pub fn y(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    /// The z-sequence
    pub fn z(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.z).collect()
    }

    /// Push `count` points evenly spaced around a circle of radius `radial` at height `z`, starting on the +x axis
    ///
    /// A rail of one point is an apex on the z axis.
    fn push_rail(&mut self, count: usize, radial: f64, z: f64) {
        if count == 1 {
            self.push(Point3::new(0.0, 0.0, z));
            return;
        }

        for theta in rail_angles(count) {
            self.push(Point3::new(radial * theta.cos(), radial * theta.sin(), z));
        }
    }
}

impl Index<usize> for Coordinates {
    type Output = Point3<f64>;

    fn index(&self, id: usize) -> &Self::Output {
        &self.points[id]
    }
}

/// `count` evenly spaced values from `start` to `end` (both included)
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
            values[count - 1] = end;
            values
        }
    }
}

/// Angles of `count` points evenly spaced around a full circle, starting at 0
pub fn rail_angles(count: usize) -> impl Iterator<Item = f64> {
    let mut angles = linspace(0.0, 2.0 * PI, count + 1);
    angles.truncate(count);
    angles.into_iter()
}

/// Rails stacked along a cylinder (or cone) of the given `height`
///
/// Rail `r` has `rails[r]` points at radius `radii[r]`, and the rails' heights are evenly spaced from 0 to `height`.
pub fn cylinder(rails: &[usize], height: f64, radii: &[f64]) -> MeshResult<Coordinates> {
    if rails.len() != radii.len() {
        return Err(MeshError::invalid_parameter(format!(
            "one radius is needed per rail ({} rails, {} radii)",
            rails.len(),
            radii.len()
        )));
    }

    let mut coords = Coordinates::with_capacity(rails.iter().sum());
    for ((count, radius), z) in rails
        .iter()
        .zip(radii.iter())
        .zip(linspace(0.0, height, rails.len()))
    {
        coords.push_rail(*count, *radius, z);
    }
    Ok(coords)
}

/// Rails stacked over a dome of the given `radius`, from the equator (elevation 0) to the pole (elevation π/2)
///
/// The rails' elevations are evenly spaced; the last rail is normally the single apex point.
pub fn dome(rails: &[usize], radius: f64) -> Coordinates {
    let mut coords = Coordinates::with_capacity(rails.iter().sum());
    for (count, elevation) in rails.iter().zip(linspace(0.0, FRAC_PI_2, rails.len())) {
        coords.push_rail(*count, radius * elevation.cos(), radius * elevation.sin());
    }
    coords
}

/// Rails stacked over a sphere of the given `radius`, from inclination `inclination_max` up to the pole (0)
///
/// The rails' inclinations (measured from the +z axis) are evenly spaced.
pub fn sphere(rails: &[usize], radius: f64, inclination_max: f64) -> Coordinates {
    let mut coords = Coordinates::with_capacity(rails.iter().sum());
    for (count, inclination) in rails
        .iter()
        .zip(linspace(inclination_max, 0.0, rails.len()))
    {
        coords.push_rail(
            *count,
            radius * inclination.sin(),
            radius * inclination.cos(),
        );
    }
    coords
}
