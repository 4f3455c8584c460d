use super::hemisphere::tri_hemisphere_rails;
use super::rails::Rails;
use super::rings::three_quad_ring_rails;
use super::{require_finite, Composer, Orientation, Surface};
use crate::coords;
use crate::error::{MeshError, MeshResult};
use crate::topology::{LocalPointRef, Mesh};

use std::f64::consts::{FRAC_PI_2, PI};
use tracing::debug;

/// Maximum distance from π at which an inclination is treated as a full sphere
pub const FULL_SPHERE_TOLERANCE: f64 = 1e-9;

/// Tessellation and size of a [sphere](Composer::sphere)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereParams {
    /// Number of triangles around each cap; ring sizes are multiples of this
    pub azimuth_divs: usize,
    /// Number of tiers (caps and rings) stacked from the lowest rail to the top
    pub incline_divs: usize,
    pub radius: f64,
    /// Inclination (from the +z axis) of the lowest rail; π gives a closed sphere
    pub inclination_max: f64,
}

impl SphereParams {
    /// A closed sphere
    pub fn full(azimuth_divs: usize, incline_divs: usize, radius: f64) -> Self {
        Self {
            azimuth_divs,
            incline_divs,
            radius,
            inclination_max: PI,
        }
    }

    /// A sphere cut off below the given inclination, leaving an open rim
    pub fn truncated(
        azimuth_divs: usize,
        incline_divs: usize,
        radius: f64,
        inclination_max: f64,
    ) -> Self {
        Self {
            azimuth_divs,
            incline_divs,
            radius,
            inclination_max,
        }
    }

    pub fn is_full(&self) -> bool {
        (self.inclination_max - PI).abs() < FULL_SPHERE_TOLERANCE
    }

    fn validate(&self) -> MeshResult<()> {
        if self.azimuth_divs == 0 || self.incline_divs == 0 {
            return Err(MeshError::invalid_parameter(format!(
                "a sphere needs at least one azimuth and one inclination division (got {} and {})",
                self.azimuth_divs, self.incline_divs
            )));
        }
        require_finite(self.radius, "sphere radius")?;
        if self.radius <= 0.0 {
            return Err(MeshError::invalid_parameter(format!(
                "sphere radius must be positive (got {})",
                self.radius
            )));
        }
        if !(self.inclination_max > 0.0 && self.inclination_max <= PI + FULL_SPHERE_TOLERANCE) {
            return Err(MeshError::invalid_parameter(format!(
                "maximum inclination must be in (0, π] (got {})",
                self.inclination_max
            )));
        }
        Ok(())
    }
}

/// One component of a sphere, bottom to top
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Tier {
    /// A downward fan of `k` triangles around the south pole
    LowerCap(usize),
    /// A downward ring of `n` three-quad patches
    LowerRing(usize),
    /// An upward ring of `n` three-quad patches
    UpperRing(usize),
    /// An upward fan of `k` triangles around the north pole
    UpperCap(usize),
}

impl Tier {
    fn rails(&self) -> Rails {
        match *self {
            Self::LowerCap(k) => tri_hemisphere_rails(k, Orientation::Downward),
            Self::LowerRing(n) => three_quad_ring_rails(n, Orientation::Downward),
            Self::UpperRing(n) => three_quad_ring_rails(n, Orientation::Upward),
            Self::UpperCap(k) => tri_hemisphere_rails(k, Orientation::Upward),
        }
    }

    fn build(&self, composer: &Composer) -> MeshResult<Mesh> {
        match *self {
            Self::LowerCap(k) => composer.assemble_tri_hemisphere(k, Orientation::Downward),
            Self::LowerRing(n) => composer.assemble_three_quad_ring(n, Orientation::Downward),
            Self::UpperRing(n) => composer.assemble_three_quad_ring(n, Orientation::Upward),
            Self::UpperCap(k) => composer.assemble_tri_hemisphere(k, Orientation::Upward),
        }
    }
}

/// Number of tiers at or above the equator
fn upper_tiers(params: &SphereParams) -> usize {
    if params.inclination_max > FRAC_PI_2 {
        (params.incline_divs as f64 * FRAC_PI_2 / params.inclination_max).round_ties_even() as usize
    } else {
        params.incline_divs
    }
}

/// `azimuth_divs * 2^exponent`, checked so that the widest rail of a ring of that size still fits
fn ring_size(azimuth_divs: usize, exponent: usize) -> MeshResult<usize> {
    u32::try_from(exponent)
        .ok()
        .and_then(|exponent| 2_usize.checked_pow(exponent))
        .and_then(|scale| scale.checked_mul(azimuth_divs))
        .filter(|size| size.checked_mul(4).is_some())
        .ok_or_else(|| {
            MeshError::invalid_parameter(format!(
                "a ring of {} * 2^{} patches is too large",
                azimuth_divs, exponent
            ))
        })
}

/// The components of a sphere, bottom to top.
///
/// Rings double in size tier by tier towards the equator and halve again above it. A full sphere has a cap at each
/// pole and the same number of tiers below and above the equator; a truncated sphere starts with its lowest ring.
pub(super) fn tier_plan(params: &SphereParams) -> MeshResult<Vec<Tier>> {
    params.validate()?;
    let az = ring_size(params.azimuth_divs, 0)?;
    let divs = params.incline_divs;
    let upper = upper_tiers(params).clamp(1, divs);
    let lower = divs - upper;
    // upper rings between the equator and the top cap
    let upper_rings = upper - 1;

    let mut tiers = Vec::with_capacity(divs);
    if params.is_full() {
        if divs % 2 != 0 {
            return Err(MeshError::invalid_parameter(format!(
                "a full sphere needs an even number of inclination divisions (got {})",
                divs
            )));
        }
        tiers.push(Tier::LowerCap(az));
        for i in 0..lower - 1 {
            tiers.push(Tier::LowerRing(ring_size(az, i)?));
        }
    } else {
        if lower > upper_rings {
            return Err(MeshError::invalid_parameter(format!(
                "{} tiers below the equator cannot be stitched to {} rings above it (maximum inclination {})",
                lower, upper_rings, params.inclination_max
            )));
        }
        for i in 0..lower {
            tiers.push(Tier::LowerRing(ring_size(az, upper_rings - lower + i)?));
        }
    }

    for i in 0..upper_rings {
        tiers.push(Tier::UpperRing(ring_size(az, upper_rings - 1 - i)?));
    }
    tiers.push(Tier::UpperCap(az));

    Ok(tiers)
}

impl Composer {
    /// A full or truncated sphere, with one coordinate per global parameter.
    ///
    /// The sphere is stacked from tiers: a downward cap at the south pole (full spheres only), downward rings
    /// below the equator, upward rings above it, and an upward cap at the north pole. Each tier's top rail is
    /// identified with the next tier's bottom rail position by position, so the global parameters run rail by rail
    /// from the lowest rail to the north pole, and rail `i` sits at the `i`-th of a set of evenly spaced inclinations
    /// from `inclination_max` to 0.
    ///
    /// A truncated sphere exposes the ids of its lowest rail as `connect_points`.
    pub fn sphere(&self, params: &SphereParams) -> MeshResult<Surface> {
        self.scoped("sphere", || self.assemble_sphere(params))
    }

    pub(super) fn assemble_sphere(&self, params: &SphereParams) -> MeshResult<Surface> {
        let tiers = tier_plan(params)?;
        debug!(?tiers, "planned sphere");

        let mut sphere = Mesh::new("sphere");
        let mut tier_rails: Vec<Rails> = Vec::with_capacity(tiers.len());
        // one entry per distinct rail: a tier's bottom rail is the previous tier's top rail
        let mut rows: Vec<usize> = Vec::new();

        for tier in tiers.iter() {
            sphere.add_element(tier.build(self)?)?;

            let rails = tier.rails();
            let shared = usize::from(!tier_rails.is_empty());
            rows.extend(rails.lens()[shared..].iter().copied());
            tier_rails.push(rails);
        }

        for (below, pair) in tier_rails.windows(2).enumerate() {
            let (top, bottom) = (
                pair[0].top().unwrap_or_default(),
                pair[1].bottom().unwrap_or_default(),
            );
            if top.len() != bottom.len() {
                return Err(MeshError::invalid_parameter(format!(
                    "tier {} ends on a rail of {} points but tier {} starts on a rail of {}",
                    below,
                    top.len(),
                    below + 1,
                    bottom.len()
                )));
            }
            for (upper_id, lower_id) in top.zip(bottom) {
                self.connect(&mut sphere, [(below, upper_id), (below + 1, lower_id)])?;
            }
        }

        let num_params = sphere.finalize()?;
        debug!(num_params, rails = rows.len(), "closed sphere");

        let coords = coords::sphere(&rows, params.radius, params.inclination_max);
        let mut surface = Surface::new(sphere, coords);

        if !params.is_full() {
            let rim = tier_rails
                .first()
                .and_then(Rails::bottom)
                .unwrap_or_default();
            let connect_points = rim
                .map(|slot| surface.mesh.global_id(LocalPointRef::new(0, slot)))
                .collect::<MeshResult<Vec<usize>>>()?;
            surface.connect_points = Some(connect_points);
        }

        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    fn composer() -> Composer {
        Composer::silent()
    }

    #[test]
    fn full_sphere_plan() {
        let params = SphereParams::full(5, 6, 1.0);
        assert!(params.is_full());
        assert_eq!(
            tier_plan(&params).unwrap(),
            vec![
                Tier::LowerCap(5),
                Tier::LowerRing(5),
                Tier::LowerRing(10),
                Tier::UpperRing(10),
                Tier::UpperRing(5),
                Tier::UpperCap(5),
            ]
        );

        let params = SphereParams::full(3, 2, 1.0);
        assert_eq!(
            tier_plan(&params).unwrap(),
            vec![Tier::LowerCap(3), Tier::UpperCap(3)]
        );
    }

    #[test]
    fn truncated_plans() {
        let params = SphereParams::truncated(5, 3, 1.0, 3.0 * FRAC_PI_4);
        assert!(!params.is_full());
        assert_eq!(
            tier_plan(&params).unwrap(),
            vec![Tier::LowerRing(5), Tier::UpperRing(5), Tier::UpperCap(5)]
        );

        let params = SphereParams::truncated(3, 2, 1.0, FRAC_PI_2);
        assert_eq!(
            tier_plan(&params).unwrap(),
            vec![Tier::UpperRing(3), Tier::UpperCap(3)]
        );
    }

    #[test]
    fn unstitchable_plans() {
        assert!(matches!(
            tier_plan(&SphereParams::full(4, 3, 1.0)),
            Err(MeshError::InvalidParameter(_))
        ));
        assert!(matches!(
            tier_plan(&SphereParams::truncated(4, 2, 1.0, 0.99 * PI)),
            Err(MeshError::InvalidParameter(_))
        ));
        assert!(matches!(
            tier_plan(&SphereParams::full(usize::MAX / 2, 4, 1.0)),
            Err(MeshError::InvalidParameter(_))
        ));
    }

    #[test]
    fn invalid_params() {
        for params in [
            SphereParams::full(0, 4, 1.0),
            SphereParams::full(4, 0, 1.0),
            SphereParams::full(4, 4, 0.0),
            SphereParams::full(4, 4, f64::INFINITY),
            SphereParams::truncated(4, 4, 1.0, 0.0),
            SphereParams::truncated(4, 4, 1.0, 4.0),
        ] {
            assert!(matches!(
                composer().sphere(&params),
                Err(MeshError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn full_sphere() {
        let surface = composer().sphere(&SphereParams::full(4, 4, 1.0)).unwrap();
        let mesh = &surface.mesh;

        // rails of 1, 4, 8, 12, 16, 12, 8, 4 and 1 points
        assert_eq!(mesh.num_params(), 66);
        assert_eq!(surface.coords.len(), 66);
        assert!(surface.connect_points.is_none());
        assert_eq!(mesh.num_elements(), 4);
        assert_eq!(mesh.tri6_point_ids().unwrap().len(), 4 + 12 + 12 + 4);

        // the south pole comes first and the north pole last
        assert_relative_eq!(surface.coords[0].z, -1.0);
        assert_relative_eq!(surface.coords[65].z, 1.0);

        for point in surface.coords.points()[25..41].iter() {
            assert_relative_eq!(point.z, 0.0, epsilon = 1e-12);
        }
        for point in surface.coords.points() {
            assert_relative_eq!(point.coords.norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn truncated_sphere() {
        let params = SphereParams::truncated(5, 3, 2.0, 3.0 * FRAC_PI_4);
        let surface = composer().sphere(&params).unwrap();

        // rails of 10, 15, 20, 15, 10, 5 and 1 points
        assert_eq!(surface.mesh.num_params(), 76);
        assert_eq!(surface.coords.len(), 76);
        assert_eq!(surface.connect_points, Some((0..10).collect::<Vec<usize>>()));

        let rim = surface.coords[0];
        assert_relative_eq!(rim.z, 2.0 * (3.0 * FRAC_PI_4).cos(), epsilon = 1e-12);
        for point in surface.coords.points()[25..45].iter() {
            assert_relative_eq!(point.z, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn upper_hemisphere_only() {
        let params = SphereParams::truncated(3, 2, 1.0, FRAC_PI_2);
        let surface = composer().sphere(&params).unwrap();

        assert_eq!(surface.mesh.num_params(), 12 + 9 + 6 + 3 + 1);
        assert_eq!(surface.connect_points.map(|ids| ids.len()), Some(12));
        assert_relative_eq!(surface.coords[0].z, 0.0, epsilon = 1e-12);
    }
}
