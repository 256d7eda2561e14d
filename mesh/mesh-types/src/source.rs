//! Triangle sources: the capability a mesh is loaded from.
//!
//! A [`TriangleSource`] yields a flat triangle soup: one
//! [`TriangleRecord`] per face, each a supplied normal and three vertex
//! positions. File readers, CAD importers and synthetic generators all
//! implement it, so [`Mesh::load`](crate::Mesh::load) never depends on a
//! concrete parser.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::MeshResult;

/// One decoded triangle: a supplied normal plus three vertex positions.
///
/// The normal may be unnormalized or zero; the mesh model normalizes it
/// or recomputes it from the winding on load.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriangleRecord {
    /// Normal as stored by the source.
    pub normal: Vector3<f64>,
    /// Vertex positions in winding order.
    pub vertices: [Point3<f64>; 3],
}

impl TriangleRecord {
    /// Create a record from a normal and three vertices.
    #[must_use]
    pub const fn new(normal: Vector3<f64>, vertices: [Point3<f64>; 3]) -> Self {
        Self { normal, vertices }
    }

    /// Create a record whose normal is left for the loader to derive.
    #[must_use]
    pub fn from_vertices(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self {
            normal: Vector3::zeros(),
            vertices: [v0, v1, v2],
        }
    }
}

/// Something that can produce a triangle soup.
///
/// Implementations report malformed, truncated or unavailable input as an
/// error instead of panicking.
pub trait TriangleSource {
    /// Decode every triangle from the source.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is missing, truncated, or cannot be
    /// decoded. An empty soup is returned as `Ok(vec![])`; rejecting it is
    /// the loader's job.
    fn read_triangles(&mut self) -> MeshResult<Vec<TriangleRecord>>;
}

/// An in-memory triangle soup.
///
/// Used for synthetic geometry and for feeding already-decoded records
/// back into a mesh.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SoupSource {
    records: Vec<TriangleRecord>,
}

impl SoupSource {
    /// Wrap a list of records.
    #[must_use]
    pub const fn new(records: Vec<TriangleRecord>) -> Self {
        Self { records }
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the soup holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrow the records.
    #[must_use]
    pub fn records(&self) -> &[TriangleRecord] {
        &self.records
    }

    /// Append a record.
    pub fn push(&mut self, record: TriangleRecord) {
        self.records.push(record);
    }
}

impl From<Vec<TriangleRecord>> for SoupSource {
    fn from(records: Vec<TriangleRecord>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<TriangleRecord> for SoupSource {
    fn from_iter<I: IntoIterator<Item = TriangleRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl TriangleSource for SoupSource {
    fn read_triangles(&mut self) -> MeshResult<Vec<TriangleRecord>> {
        Ok(self.records.clone())
    }
}
