use super::sphere::SphereParams;
use super::{require_finite, Composer, RailRadii, Surface};
use crate::coords::{self, Coordinates};
use crate::error::{MeshError, MeshResult};
use crate::topology::{LocalPointRef, Mesh};

use std::f64::consts::FRAC_PI_4;
use tracing::debug;

/// Size and tessellation of a [head_neck](Composer::head_neck)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadNeckParams {
    pub head_radius: f64,
    pub neck_length: f64,
    /// Radius at the base of the neck; `None` uses the radius of the head's rim
    pub neck_radius: Option<f64>,
    pub head_azimuth_divs: usize,
    pub head_incline_divs: usize,
    /// Inclination of the head's rim, measured from the top of the head
    pub head_inclination_max: f64,
    /// Number of rings stacked along the neck
    pub neck_divs: usize,
}

impl HeadNeckParams {
    pub fn new(head_radius: f64, neck_length: f64) -> Self {
        Self {
            head_radius,
            neck_length,
            ..Default::default()
        }
    }

    fn head(&self) -> SphereParams {
        SphereParams::truncated(
            self.head_azimuth_divs,
            self.head_incline_divs,
            self.head_radius,
            self.head_inclination_max,
        )
    }

    fn validate(&self) -> MeshResult<()> {
        require_finite(self.neck_length, "neck length")?;
        if self.neck_length <= 0.0 {
            return Err(MeshError::invalid_parameter(format!(
                "neck length must be positive (got {})",
                self.neck_length
            )));
        }
        if let Some(radius) = self.neck_radius {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(MeshError::invalid_parameter(format!(
                    "a neck radius must be finite and positive (got {}); leave it unset to match the rim",
                    radius
                )));
            }
        }
        if self.neck_divs == 0 {
            return Err(MeshError::invalid_parameter(
                "a neck needs at least one ring",
            ));
        }
        if self.head().is_full() {
            return Err(MeshError::invalid_parameter(
                "the head must be truncated to leave a rim for the neck",
            ));
        }
        Ok(())
    }
}

impl Default for HeadNeckParams {
    fn default() -> Self {
        Self {
            head_radius: 1.0,
            neck_length: 1.0,
            neck_radius: None,
            head_azimuth_divs: 5,
            head_incline_divs: 3,
            head_inclination_max: 3.0 * FRAC_PI_4,
            neck_divs: 1,
        }
    }
}

impl Composer {
    /// A truncated sphere (the head) on a stack of [two-quad rings](Composer::two_quad_ring) (the neck).
    ///
    /// The neck hangs below the head's rim, tapering linearly from `neck_radius` at its base to the radius of the rim.
    /// Its top rail is identified with the head's rim, so the neck's rails come first in the numbering (bottom to top,
    /// one rail per half ring) and are followed by the head's. The base rail ids are exposed as `connect_points`.
    pub fn head_neck(&self, params: &HeadNeckParams) -> MeshResult<Surface> {
        self.scoped("head_neck", || {
            params.validate()?;

            let head = self.assemble_sphere(&params.head())?;
            let rim: Vec<usize> = head.connect_points.clone().unwrap_or_default();
            let rim_len = rim.len();
            if rim_len == 0 || rim_len % 2 != 0 {
                return Err(MeshError::invalid_parameter(format!(
                    "a neck cannot be fitted to a rim of {} points",
                    rim_len
                )));
            }

            let rim_radius = params.head_radius * params.head_inclination_max.sin();
            let rim_z = head.coords.get(rim[0]).map(|point| point.z).unwrap_or_default();
            let base_radius = params.neck_radius.unwrap_or(rim_radius);
            let divs = params.neck_divs;

            let radii = coords::linspace(base_radius, rim_radius, 2 * divs + 1);
            let segment = params.neck_length / divs as f64;

            let mut mesh = Mesh::new("head_neck");
            let mut coordinates = Coordinates::with_capacity(2 * rim_len * divs + head.coords.len());

            for (ring_id, ring_radii) in radii.windows(3).step_by(2).enumerate() {
                let ring = self.assemble_two_quad_ring_surface(
                    rim_len / 2,
                    segment,
                    RailRadii::PerRail([ring_radii[0], ring_radii[1], ring_radii[2]]),
                )?;

                // the top rail belongs to the next ring (or the head)
                let mut ring_coords = ring.coords;
                ring_coords.truncate(2 * rim_len);
                ring_coords.translate_z(0..2 * rim_len, rim_z - segment * (divs - ring_id) as f64)?;

                coordinates.append(ring_coords);
                mesh.add_element(ring.mesh)?;
            }

            let head_id = mesh.add_element(head.mesh)?;
            coordinates.append(head.coords);

            for ring_id in 0..divs {
                let above = ring_id + 1;
                for pos in 0..rim_len {
                    let lower_id = if above == head_id { rim[pos] } else { pos };
                    self.connect(
                        &mut mesh,
                        [(ring_id, 2 * rim_len + pos), (above, lower_id)],
                    )?;
                }
            }

            let num_params = mesh.finalize()?;
            debug!(num_params, rings = divs, "attached neck");

            let connect_points = (0..rim_len)
                .map(|slot| mesh.global_id(LocalPointRef::new(0, slot)))
                .collect::<MeshResult<Vec<usize>>>()?;

            let mut surface = Surface::new(mesh, coordinates);
            surface.connect_points = Some(connect_points);
            Ok(surface)
        })
    }
}
