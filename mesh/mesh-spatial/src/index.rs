//! Spatial index built from a mesh.

use mesh_types::{Mesh, MeshBounds, Point3, Vector3};
use tracing::{debug, info};

use crate::bvh::{BvhNode, BvhParams, BvhStats};
use crate::ray::{Ray, RayHit};

/// A hit face opposes the query normal when `dot(n_hit, n_query)` is below this.
pub const OPPOSING_DOT_THRESHOLD: f64 = -0.1;

/// Ray-casting acceleration structure for one mesh revision.
///
/// The index holds face indices grouped by bounding box, not triangle data;
/// every query resolves positions through the mesh it is given. It records
/// the [`revision`](Mesh::revision) it was built from and does not follow
/// later changes: after [`Mesh::reorient`] it is stale, queries against it
/// find nothing, and it must be rebuilt. Degenerate faces are left out.
///
/// Read-only after construction, so it can be shared across threads.
///
/// # Example
///
/// ```
/// use mesh_spatial::SpatialIndex;
/// use mesh_types::{primitives, Mesh, Point3, Vector3};
///
/// let mesh = Mesh::from_source(&mut primitives::cuboid(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(10.0, 10.0, 2.0),
/// ))
/// .unwrap();
/// let index = SpatialIndex::build(&mesh);
///
/// // From the top face, the bottom face is 2 mm below.
/// let d = index
///     .nearest_opposing_surface(&mesh, &Point3::new(5.0, 5.0, 2.0), &Vector3::z())
///     .unwrap();
/// assert!((d - 2.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    root: Option<BvhNode>,
    face_count: usize,
    revision: u64,
    search_radius: f64,
    stats: BvhStats,
}

impl SpatialIndex {
    /// Build with default [`BvhParams`].
    #[must_use]
    pub fn build(mesh: &Mesh) -> Self {
        Self::build_with(mesh, &BvhParams::default())
    }

    /// Build with explicit hierarchy limits.
    #[must_use]
    pub fn build_with(mesh: &Mesh, params: &BvhParams) -> Self {
        let mut faces: Vec<usize> = mesh
            .faces()
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.is_degenerate())
            .map(|(i, _)| i)
            .collect();
        let indexed = faces.len();

        let root = BvhNode::build(mesh, &mut faces, params);
        let stats = root.as_ref().map(BvhNode::stats).unwrap_or_default();
        let search_radius = mesh.bounds().diagonal();

        info!(
            triangles = indexed,
            nodes = stats.nodes,
            leaves = stats.leaves,
            depth = stats.depth,
            "Built spatial index"
        );

        Self {
            root,
            face_count: mesh.faces().len(),
            revision: mesh.revision(),
            search_radius,
            stats,
        }
    }

    /// Revision of the mesh this index was built from.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether `mesh` has changed (or is a different mesh) since the build.
    #[must_use]
    pub const fn is_stale(&self, mesh: &Mesh) -> bool {
        self.revision != mesh.revision()
    }

    /// Maximum query distance: the mesh bounding-box diagonal.
    #[must_use]
    pub const fn search_radius(&self) -> f64 {
        self.search_radius
    }

    /// Shape of the hierarchy.
    #[must_use]
    pub const fn stats(&self) -> BvhStats {
        self.stats
    }

    /// Number of faces in the mesh at build time, degenerate ones included.
    #[must_use]
    pub const fn face_count(&self) -> usize {
        self.face_count
    }

    /// Closest hit along `ray` within `max_distance`.
    ///
    /// Returns `None` if the index is stale for `mesh`.
    #[must_use]
    pub fn cast_ray(&self, mesh: &Mesh, ray: &Ray, max_distance: f64) -> Option<RayHit> {
        self.cast_ray_filtered(mesh, ray, max_distance, |_| true)
    }

    /// Closest hit along `ray` within `max_distance` whose face passes `accept`.
    ///
    /// Returns `None` if the index is stale for `mesh`.
    pub fn cast_ray_filtered<F>(
        &self,
        mesh: &Mesh,
        ray: &Ray,
        max_distance: f64,
        accept: F,
    ) -> Option<RayHit>
    where
        F: Fn(usize) -> bool,
    {
        if self.is_stale(mesh) {
            debug!(
                index_revision = self.revision,
                mesh_revision = mesh.revision(),
                "Ray cast against stale index"
            );
            return None;
        }
        self.root
            .as_ref()?
            .closest_hit(ray, mesh, max_distance, &accept)
    }

    /// Distance from `point` to the nearest surface facing back at it.
    ///
    /// `normal` is the outward surface normal at `point`. A single ray runs
    /// along `-normal`; the outward half-line is never cast, so surfaces
    /// outside the solid do not count as walls. Only faces whose normal satisfies
    /// `dot(n_hit, normal) < OPPOSING_DOT_THRESHOLD` count, which skips
    /// coplanar and same-facing surfaces. Returns `None` when nothing
    /// qualifies within [`search_radius`](Self::search_radius), when
    /// `normal` is zero, or when the index is stale for `mesh`.
    #[must_use]
    pub fn nearest_opposing_surface(
        &self,
        mesh: &Mesh,
        point: &Point3<f64>,
        normal: &Vector3<f64>,
    ) -> Option<f64> {
        let ray = Ray::new(*point, -normal)?;
        let outward = -ray.direction;
        let faces = mesh.faces();

        let hit = self.cast_ray_filtered(mesh, &ray, self.search_radius, |face| {
            faces[face].normal.dot(&outward) < OPPOSING_DOT_THRESHOLD
        });

        if let Some(h) = &hit {
            debug!(face = h.face, distance = h.distance, "Opposing surface hit");
        }
        hit.map(|h| h.distance)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{SoupSource, TriangleRecord, UnitQuaternion, primitives};

    fn slab(thickness: f64) -> Mesh {
        Mesh::from_source(&mut primitives::thin_plate(10.0, 10.0, thickness)).unwrap()
    }

    #[test]
    fn index_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SpatialIndex>();
    }

    #[test]
    fn thin_plate_corner_sees_opposite_face() {
        let mesh = slab(0.1);
        let index = SpatialIndex::build(&mesh);
        let normals = mesh.vertex_normals();

        for (vertex, normal) in mesh.vertices().iter().zip(&normals) {
            let d = index.nearest_opposing_surface(&mesh, vertex, normal).unwrap();
            assert!(d > 0.1 - 1e-9 && d < 0.1 * 6.0_f64.sqrt() + 1e-9);
        }

        // The origin corner's normal is the (-1, -1, -1) diagonal.
        let d = index
            .nearest_opposing_surface(&mesh, &mesh.vertices()[0], &normals[0])
            .unwrap();
        assert_relative_eq!(d, 0.1 * 3.0_f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn same_facing_surfaces_are_skipped() {
        // Two stacked triangles, both facing +Z.
        let up = |z: f64| {
            TriangleRecord::new(
                Vector3::z(),
                [
                    Point3::new(0.0, 0.0, z),
                    Point3::new(1.0, 0.0, z),
                    Point3::new(0.0, 1.0, z),
                ],
            )
        };
        let mesh = Mesh::from_source(&mut SoupSource::from(vec![up(1.0), up(0.0)])).unwrap();
        let index = SpatialIndex::build(&mesh);

        // Looking down from above: both faces point back up the query normal.
        assert!(
            index
                .nearest_opposing_surface(&mesh, &Point3::new(0.2, 0.2, 2.0), &Vector3::z())
                .is_none()
        );

        // Looking up from below: the lower face opposes the query normal.
        let d = index
            .nearest_opposing_surface(&mesh, &Point3::new(0.2, 0.2, -1.0), &-Vector3::z())
            .unwrap();
        assert_relative_eq!(d, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn only_the_inward_side_is_searched() {
        let mesh = Mesh::from_source(&mut primitives::cuboid(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 4.0),
        ))
        .unwrap();
        let index = SpatialIndex::build(&mesh);

        // The floor is 1 away behind the point; the roof is 3 away ahead of it.
        let d = index
            .nearest_opposing_surface(&mesh, &Point3::new(0.3, 0.6, 1.0), &-Vector3::z())
            .unwrap();
        assert_relative_eq!(d, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn opposing_surface_within_radius() {
        let mesh = Mesh::from_source(&mut primitives::cuboid(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 4.0),
        ))
        .unwrap();
        let index = SpatialIndex::build(&mesh);
        assert_relative_eq!(index.search_radius(), 18.0_f64.sqrt());

        let d = index
            .nearest_opposing_surface(&mesh, &Point3::new(0.5, 0.5, 4.0), &Vector3::z())
            .unwrap();
        assert_relative_eq!(d, 4.0, epsilon = 1e-9);

        let d = index
            .nearest_opposing_surface(&mesh, &Point3::new(0.0, 0.5, 2.0), &-Vector3::x())
            .unwrap();
        assert_relative_eq!(d, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_normal_finds_nothing() {
        let mesh = slab(1.0);
        let index = SpatialIndex::build(&mesh);
        assert!(
            index
                .nearest_opposing_surface(&mesh, &Point3::new(5.0, 5.0, 1.0), &Vector3::zeros())
                .is_none()
        );
    }

    #[test]
    fn reorient_makes_index_stale() {
        let mut mesh = slab(1.0);
        let index = SpatialIndex::build(&mesh);
        assert!(!index.is_stale(&mesh));
        assert_eq!(index.revision(), mesh.revision());

        let probe = Point3::new(5.0, 5.0, 1.0);
        assert!(index.nearest_opposing_surface(&mesh, &probe, &Vector3::z()).is_some());

        mesh.reorient(&UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.3));
        assert!(index.is_stale(&mesh));
        assert!(index.nearest_opposing_surface(&mesh, &probe, &Vector3::z()).is_none());

        let other = slab(1.0);
        assert!(index.is_stale(&other));
    }

    #[test]
    fn degenerate_faces_are_not_indexed() {
        let records = vec![
            TriangleRecord::from_vertices(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ),
            TriangleRecord::from_vertices(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ),
        ];
        let mesh = Mesh::from_source(&mut SoupSource::new(records)).unwrap();
        let index = SpatialIndex::build(&mesh);
        assert_eq!(index.face_count(), 2);
        assert_eq!(index.stats().leaves, 1);

        let ray = Ray::new(Point3::new(0.2, 0.2, 1.0), -Vector3::z()).unwrap();
        assert_eq!(index.cast_ray(&mesh, &ray, 10.0).unwrap().face, 1);
    }

    #[test]
    fn empty_mesh_index() {
        let mesh = Mesh::new();
        let index = SpatialIndex::build(&mesh);
        assert_eq!(index.stats(), BvhStats::default());
        let ray = Ray::new(Point3::origin(), Vector3::z()).unwrap();
        assert!(index.cast_ray(&mesh, &ray, f64::INFINITY).is_none());
    }
}
