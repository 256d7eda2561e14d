//! Welded triangle mesh built from a triangle soup.

use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use nalgebra::{Point3, UnitQuaternion, Vector3};
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MeshError, MeshResult};
use crate::source::{TriangleRecord, TriangleSource};
use crate::{Aabb, MeshBounds, MeshTopology, Triangle};

/// Supplied normals shorter than this are recomputed from the winding.
pub const MIN_NORMAL_LENGTH: f64 = 1e-6;

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// A triangular face of a [`Mesh`].
///
/// Stores indices into the mesh's vertex array, a unit outward normal and
/// the face area. Degenerate faces (zero area) keep their indices but have
/// a zero normal and zero area, and are excluded from angle and area
/// statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Face {
    /// Vertex indices in winding order.
    pub indices: [u32; 3],
    /// Unit outward normal, or zero for degenerate faces.
    pub normal: Vector3<f64>,
    /// Triangle area, or zero for degenerate faces.
    pub area: f64,
    degenerate: bool,
}

impl Face {
    /// Whether the face has zero area.
    #[inline]
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.degenerate
    }
}

/// An immutable, welded triangle mesh.
///
/// Created by loading a [`TriangleSource`]. Vertices with bit-identical
/// coordinates are merged so faces share them. After loading, the only
/// mutation is [`Mesh::reorient`], which rotates the geometry in place and
/// gives the mesh a new [`revision`](Mesh::revision) so derived structures
/// can tell they are stale. Revisions are never serialized: a deserialized
/// mesh always starts on a fresh one.
///
/// # Example
///
/// ```
/// use mesh_types::{Mesh, MeshTopology, Point3, SoupSource, TriangleRecord};
///
/// let mut soup = SoupSource::new(vec![TriangleRecord::from_vertices(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// )]);
///
/// let mesh = Mesh::from_source(&mut soup).unwrap();
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.triangle_count(), 1);
/// assert!((mesh.faces()[0].normal.z - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mesh {
    vertices: Vec<Point3<f64>>,
    faces: Vec<Face>,
    bounds: Aabb,
    #[cfg_attr(feature = "serde", serde(skip, default = "next_revision"))]
    revision: u64,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    /// Create an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            bounds: Aabb::empty(),
            revision: next_revision(),
        }
    }

    /// Build a mesh from a triangle source.
    ///
    /// # Errors
    ///
    /// Returns the source's error if it cannot be read, or
    /// [`MeshError::EmptySource`] if it yields no triangles.
    pub fn from_source<S: TriangleSource + ?Sized>(source: &mut S) -> MeshResult<Self> {
        let records = source.read_triangles()?;
        Self::from_records(&records)
    }

    /// Build a mesh from already-decoded triangle records.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::EmptySource`] for an empty slice and
    /// [`MeshError::TooManyVertices`] if the welded vertex count does not
    /// fit in `u32` indices.
    pub fn from_records(records: &[TriangleRecord]) -> MeshResult<Self> {
        if records.is_empty() {
            return Err(MeshError::EmptySource);
        }

        let mut welder = VertexWelder::with_capacity(records.len() * 3);
        let mut faces = Vec::with_capacity(records.len());
        let mut degenerate_count = 0usize;

        for record in records {
            let [p0, p1, p2] = record.vertices;
            let indices = [welder.insert(p0)?, welder.insert(p1)?, welder.insert(p2)?];
            let face = build_face(indices, record);
            if face.degenerate {
                degenerate_count += 1;
            }
            faces.push(face);
        }

        let vertices = welder.into_vertices();
        let bounds = Aabb::from_points(vertices.iter());

        info!(
            vertices = vertices.len(),
            triangles = faces.len(),
            "Loaded mesh"
        );
        if degenerate_count > 0 {
            debug!(degenerate = degenerate_count, "Mesh has zero-area triangles");
        }

        Ok(Self {
            vertices,
            faces,
            bounds,
            revision: next_revision(),
        })
    }

    /// Replace this mesh's contents with the triangles from `source`.
    ///
    /// On failure the mesh is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Same as [`Mesh::from_source`].
    pub fn load<S: TriangleSource + ?Sized>(&mut self, source: &mut S) -> MeshResult<()> {
        *self = Self::from_source(source)?;
        Ok(())
    }

    /// Vertex positions, welded.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Faces in load order.
    #[inline]
    #[must_use]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Identifier of the current geometry.
    ///
    /// Every construction and every [`reorient`](Mesh::reorient) produces a
    /// new, process-unique revision. Clones share the revision of their
    /// source because their geometry is identical.
    #[inline]
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Resolve a face to its vertex positions.
    ///
    /// Returns `None` if `face_index` is out of range.
    #[must_use]
    pub fn triangle(&self, face_index: usize) -> Option<Triangle> {
        self.faces.get(face_index).map(|face| self.resolve(face))
    }

    /// Iterate over all faces as positioned triangles.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().map(|face| self.resolve(face))
    }

    #[inline]
    fn resolve(&self, face: &Face) -> Triangle {
        let [i0, i1, i2] = face.indices;
        Triangle::new(
            self.vertices[i0 as usize],
            self.vertices[i1 as usize],
            self.vertices[i2 as usize],
        )
    }

    /// Rotate every vertex and face normal in place.
    ///
    /// The mesh receives a new revision, so any spatial index built earlier
    /// is stale afterwards.
    pub fn reorient(&mut self, rotation: &UnitQuaternion<f64>) {
        for vertex in &mut self.vertices {
            *vertex = rotation * *vertex;
        }
        for face in &mut self.faces {
            if !face.degenerate {
                face.normal = rotation * face.normal;
            }
        }
        self.bounds = Aabb::from_points(self.vertices.iter());
        self.revision = next_revision();

        debug!(revision = self.revision, "Reoriented mesh");
    }

    /// Per-vertex normals.
    ///
    /// Each is the normalized, unweighted sum of the unit normals of the
    /// non-degenerate faces using the vertex. Vertices with no such face,
    /// or whose face normals cancel out, get the zero vector.
    #[must_use]
    pub fn vertex_normals(&self) -> Vec<Vector3<f64>> {
        let mut normals = vec![Vector3::zeros(); self.vertices.len()];

        for face in self.faces.iter().filter(|f| !f.degenerate) {
            for &vi in &face.indices {
                normals[vi as usize] += face.normal;
            }
        }

        for normal in &mut normals {
            let len = normal.norm();
            if len > MIN_NORMAL_LENGTH {
                *normal /= len;
            } else {
                *normal = Vector3::zeros();
            }
        }

        normals
    }

    /// Total area of all non-degenerate faces.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.faces.iter().map(|f| f.area).sum()
    }

    /// Signed enclosed volume (sum of signed origin tetrahedra).
    ///
    /// Positive for a closed mesh with outward winding. Meaningless for open
    /// meshes.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let volume: f64 = self
            .triangles()
            .map(|tri| tri.v0.coords.dot(&tri.v1.coords.cross(&tri.v2.coords)))
            .sum();
        volume / 6.0
    }

    /// Absolute enclosed volume.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// Whether every edge is shared by exactly two faces.
    ///
    /// An empty mesh is not watertight.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        if self.faces.is_empty() {
            return false;
        }

        let mut edge_count: HashMap<(u32, u32), u32> = HashMap::new();
        for face in &self.faces {
            let [a, b, c] = face.indices;
            for (p, q) in [(a, b), (b, c), (c, a)] {
                *edge_count.entry((p.min(q), p.max(q))).or_insert(0) += 1;
            }
        }

        edge_count.values().all(|&count| count == 2)
    }

    /// Extents of the bounding box along X, Y and Z.
    #[must_use]
    pub fn dimensions(&self) -> Vector3<f64> {
        self.bounds.size()
    }

    /// Number of faces flagged as degenerate.
    #[must_use]
    pub fn degenerate_count(&self) -> usize {
        self.faces.iter().filter(|f| f.degenerate).count()
    }
}

impl MeshTopology for Mesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn triangle_count(&self) -> usize {
        self.faces.len()
    }
}

impl MeshBounds for Mesh {
    #[inline]
    fn bounds(&self) -> Aabb {
        self.bounds
    }
}

/// Pick the face normal: the supplied one when usable, else the winding's.
fn build_face(indices: [u32; 3], record: &TriangleRecord) -> Face {
    let [v0, v1, v2] = record.vertices;
    let tri = Triangle::new(v0, v1, v2);

    if tri.is_degenerate() || !tri.area().is_finite() {
        return Face {
            indices,
            normal: Vector3::zeros(),
            area: 0.0,
            degenerate: true,
        };
    }

    let supplied_len = record.normal.norm();
    let normal = if supplied_len.is_finite() && supplied_len >= MIN_NORMAL_LENGTH {
        record.normal / supplied_len
    } else {
        // Non-degenerate triangles always have a winding normal.
        tri.normal().unwrap_or_else(Vector3::zeros)
    };

    Face {
        indices,
        normal,
        area: tri.area(),
        degenerate: false,
    }
}

/// Merges vertices with bit-identical coordinates.
struct VertexWelder {
    lookup: HashMap<[u64; 3], u32>,
    vertices: Vec<Point3<f64>>,
}

impl VertexWelder {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            lookup: HashMap::with_capacity(capacity),
            vertices: Vec::with_capacity(capacity),
        }
    }

    fn insert(&mut self, point: Point3<f64>) -> MeshResult<u32> {
        // Adding 0.0 folds -0.0 into +0.0 so both weld together.
        let key = [
            (point.x + 0.0).to_bits(),
            (point.y + 0.0).to_bits(),
            (point.z + 0.0).to_bits(),
        ];

        if let Some(&index) = self.lookup.get(&key) {
            return Ok(index);
        }

        let index = u32::try_from(self.vertices.len()).map_err(|_| MeshError::TooManyVertices {
            max: u64::from(u32::MAX),
        })?;
        self.vertices.push(point);
        self.lookup.insert(key, index);
        Ok(index)
    }

    fn into_vertices(self) -> Vec<Point3<f64>> {
        self.vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::cuboid;
    use crate::source::SoupSource;
    use approx::assert_relative_eq;

    fn record(v: [[f64; 3]; 3], n: [f64; 3]) -> TriangleRecord {
        TriangleRecord::new(
            Vector3::from(n),
            [Point3::from(v[0]), Point3::from(v[1]), Point3::from(v[2])],
        )
    }

    #[test]
    fn empty_source_fails() {
        let mut soup = SoupSource::default();
        assert!(matches!(
            Mesh::from_source(&mut soup),
            Err(MeshError::EmptySource)
        ));
    }

    #[test]
    fn failed_load_keeps_previous_mesh() {
        let mut mesh = Mesh::from_source(&mut cuboid(
            Point3::origin(),
            Point3::new(1.0, 1.0, 1.0),
        ))
        .unwrap();
        let revision = mesh.revision();

        let result = mesh.load(&mut SoupSource::default());
        assert!(result.is_err());
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.revision(), revision);
    }

    #[test]
    fn welding_shares_vertices() {
        let mesh =
            Mesh::from_source(&mut cuboid(Point3::origin(), Point3::new(2.0, 3.0, 4.0))).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.is_watertight());
    }

    #[test]
    fn negative_zero_welds_with_zero() {
        let records = [
            record([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], [0.0; 3]),
            record([[-0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]], [0.0; 3]),
        ];
        let mesh = Mesh::from_records(&records).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn supplied_normal_is_normalized() {
        let records = [record(
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            [0.0, 0.0, 7.0],
        )];
        let mesh = Mesh::from_records(&records).unwrap();
        assert_relative_eq!(mesh.faces()[0].normal.norm(), 1.0);
        assert_relative_eq!(mesh.faces()[0].normal.z, 1.0);
    }

    #[test]
    fn supplied_normal_wins_over_winding() {
        // Winding says +Z, the source says -Z.
        let records = [record(
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            [0.0, 0.0, -1.0],
        )];
        let mesh = Mesh::from_records(&records).unwrap();
        assert_relative_eq!(mesh.faces()[0].normal.z, -1.0);
    }

    #[test]
    fn tiny_normal_is_recomputed_from_winding() {
        let records = [record(
            [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
            [0.0, 0.0, 1e-9],
        )];
        let mesh = Mesh::from_records(&records).unwrap();
        assert_relative_eq!(mesh.faces()[0].normal.z, -1.0);
        assert_relative_eq!(mesh.faces()[0].area, 0.5);
    }

    #[test]
    fn degenerate_face_is_kept_and_flagged() {
        let records = [
            record([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], [0.0; 3]),
            record([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]], [0.0, 0.0, 1.0]),
        ];
        let mesh = Mesh::from_records(&records).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.degenerate_count(), 1);

        let face = mesh.faces()[1];
        assert!(face.is_degenerate());
        assert_eq!(face.normal, Vector3::zeros());
        assert_relative_eq!(face.area, 0.0);
        assert_relative_eq!(mesh.surface_area(), 0.5);
    }

    #[test]
    fn bounds_and_dimensions() {
        let mesh = Mesh::from_source(&mut cuboid(
            Point3::new(-1.0, 0.0, 2.0),
            Point3::new(1.0, 5.0, 3.0),
        ))
        .unwrap();
        let bounds = mesh.bounds();
        assert_eq!(bounds.min, Point3::new(-1.0, 0.0, 2.0));
        assert_eq!(bounds.max, Point3::new(1.0, 5.0, 3.0));
        assert_eq!(mesh.dimensions(), Vector3::new(2.0, 5.0, 1.0));
    }

    #[test]
    fn volume_and_area_of_box() {
        let mesh =
            Mesh::from_source(&mut cuboid(Point3::origin(), Point3::new(2.0, 3.0, 4.0))).unwrap();
        assert_relative_eq!(mesh.volume(), 24.0, epsilon = 1e-9);
        assert!(mesh.signed_volume() > 0.0);
        assert_relative_eq!(mesh.surface_area(), 52.0, epsilon = 1e-9);
    }

    #[test]
    fn open_mesh_is_not_watertight() {
        let records = [record(
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            [0.0; 3],
        )];
        let mesh = Mesh::from_records(&records).unwrap();
        assert!(!mesh.is_watertight());
        assert!(!Mesh::new().is_watertight());
    }

    #[test]
    fn reorient_rotates_geometry_and_bumps_revision() {
        let mut mesh =
            Mesh::from_source(&mut cuboid(Point3::origin(), Point3::new(1.0, 2.0, 10.0))).unwrap();
        let before = mesh.revision();

        let rotation =
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f64::consts::FRAC_PI_2);
        mesh.reorient(&rotation);

        assert_ne!(mesh.revision(), before);
        let dims = mesh.dimensions();
        assert_relative_eq!(dims.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(dims.y, 10.0, epsilon = 1e-9);
        assert_relative_eq!(dims.z, 2.0, epsilon = 1e-9);

        for face in mesh.faces() {
            assert_relative_eq!(face.normal.norm(), 1.0, epsilon = 1e-12);
        }
        assert_relative_eq!(mesh.volume(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn clone_shares_revision() {
        let mesh = Mesh::from_source(&mut cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0)))
            .unwrap();
        assert_eq!(mesh.clone().revision(), mesh.revision());
        assert_ne!(Mesh::new().revision(), mesh.revision());
    }

    #[test]
    fn vertex_normals_point_outward_on_box() {
        let mesh = Mesh::from_source(&mut cuboid(
            Point3::new(-1.0, -1.0, -1.0),
            Point3::new(1.0, 1.0, 1.0),
        ))
        .unwrap();
        let normals = mesh.vertex_normals();
        assert_eq!(normals.len(), 8);
        for (vertex, normal) in mesh.vertices().iter().zip(&normals) {
            assert_relative_eq!(normal.norm(), 1.0, epsilon = 1e-12);
            assert!(vertex.coords.dot(normal) > 0.0);
        }
    }

    #[test]
    fn empty_mesh_accessors() {
        let mesh = Mesh::default();
        assert!(mesh.is_empty());
        assert!(mesh.bounds().is_empty());
        assert!(mesh.triangle(0).is_none());
        assert_relative_eq!(mesh.surface_area(), 0.0);
        assert!(mesh.vertex_normals().is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialized_mesh_gets_fresh_revision() {
        let mesh = Mesh::from_source(&mut cuboid(
            Point3::origin(),
            Point3::new(2.0, 3.0, 4.0),
        ))
        .unwrap();

        let json = serde_json::to_string(&mesh).unwrap();
        assert!(!json.contains("revision"));

        let received: Mesh = serde_json::from_str(&json).unwrap();
        let again: Mesh = serde_json::from_str(&json).unwrap();
        assert_ne!(received.revision(), mesh.revision());
        assert_ne!(received.revision(), again.revision());
        assert_eq!(received.vertices(), mesh.vertices());
        assert_eq!(received.faces(), mesh.faces());
    }
}
