//! Traits for mesh types.

use crate::Aabb;
use nalgebra::Point3;

/// Element counts of a triangle mesh.
pub trait MeshTopology {
    /// Number of (welded) vertices.
    fn vertex_count(&self) -> usize;

    /// Number of triangles, degenerate ones included.
    fn triangle_count(&self) -> usize;

    /// Check if the mesh has no triangles.
    fn is_empty(&self) -> bool {
        self.vertex_count() == 0 || self.triangle_count() == 0
    }
}

/// Trait for types with an axis-aligned bounding box.
pub trait MeshBounds {
    /// The axis-aligned bounding box.
    ///
    /// Returns an empty AABB if the mesh has no vertices.
    fn bounds(&self) -> Aabb;

    /// The bounding box, or `None` if empty.
    fn bounds_opt(&self) -> Option<Aabb> {
        let b = self.bounds();
        if b.is_empty() { None } else { Some(b) }
    }

    /// Center of the bounding box.
    fn center(&self) -> Point3<f64> {
        self.bounds().center()
    }
}
