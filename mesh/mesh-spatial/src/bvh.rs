//! Bounding volume hierarchy over triangle indices.

use mesh_types::{Aabb, Mesh, Point3};

use crate::ray::{Ray, RayHit};

/// Build limits for the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BvhParams {
    /// Nodes with at most this many triangles become leaves.
    pub max_leaf_size: usize,
    /// Recursion stops at this depth; deeper sets become one leaf.
    pub max_depth: usize,
}

impl Default for BvhParams {
    fn default() -> Self {
        Self {
            max_leaf_size: 10,
            max_depth: 32,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum BvhNode {
    Leaf {
        bounds: Aabb,
        faces: Vec<usize>,
    },
    Internal {
        bounds: Aabb,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
}

/// Shape of a built tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BvhStats {
    /// Total node count.
    pub nodes: usize,
    /// Leaf count.
    pub leaves: usize,
    /// Longest root-to-leaf path (root = 1).
    pub depth: usize,
}

impl BvhNode {
    /// Build over the mesh faces listed in `faces`.
    ///
    /// Returns `None` for an empty set.
    pub(crate) fn build(mesh: &Mesh, faces: &mut [usize], params: &BvhParams) -> Option<Self> {
        if faces.is_empty() {
            return None;
        }

        // Scratch per-face data, indexed by face index and dropped after the build.
        let boxes: Vec<(Aabb, Point3<f64>)> = mesh
            .triangles()
            .map(|tri| (tri.bounds(), tri.centroid()))
            .collect();

        Some(Self::build_node(&boxes, faces, params, 0))
    }

    fn build_node(
        boxes: &[(Aabb, Point3<f64>)],
        faces: &mut [usize],
        params: &BvhParams,
        depth: usize,
    ) -> Self {
        let bounds = faces
            .iter()
            .fold(Aabb::empty(), |acc, &f| acc.union(&boxes[f].0));

        if faces.len() <= params.max_leaf_size.max(1) || depth + 1 >= params.max_depth {
            return Self::Leaf {
                bounds,
                faces: faces.to_vec(),
            };
        }

        // Split at the median centroid along the longest axis of the centroids.
        let mut centroid_bounds = Aabb::empty();
        for &f in faces.iter() {
            centroid_bounds.expand_to_include(&boxes[f].1);
        }
        let axis = centroid_bounds.longest_axis();

        let mid = faces.len() / 2;
        faces.select_nth_unstable_by(mid, |&a, &b| boxes[a].1[axis].total_cmp(&boxes[b].1[axis]));
        let (left, right) = faces.split_at_mut(mid);

        Self::Internal {
            bounds,
            left: Box::new(Self::build_node(boxes, left, params, depth + 1)),
            right: Box::new(Self::build_node(boxes, right, params, depth + 1)),
        }
    }

    const fn bounds(&self) -> &Aabb {
        match self {
            Self::Leaf { bounds, .. } | Self::Internal { bounds, .. } => bounds,
        }
    }

    pub(crate) fn stats(&self) -> BvhStats {
        match self {
            Self::Leaf { .. } => BvhStats {
                nodes: 1,
                leaves: 1,
                depth: 1,
            },
            Self::Internal { left, right, .. } => {
                let l = left.stats();
                let r = right.stats();
                BvhStats {
                    nodes: l.nodes + r.nodes + 1,
                    leaves: l.leaves + r.leaves,
                    depth: l.depth.max(r.depth) + 1,
                }
            }
        }
    }

    /// Closest hit within `max_distance` that `accept` agrees to.
    pub(crate) fn closest_hit<F>(
        &self,
        ray: &Ray,
        mesh: &Mesh,
        max_distance: f64,
        accept: &F,
    ) -> Option<RayHit>
    where
        F: Fn(usize) -> bool,
    {
        match ray.intersect_aabb(self.bounds()) {
            Some((t_near, _)) if t_near <= max_distance => {}
            _ => return None,
        }

        match self {
            Self::Leaf { faces, .. } => {
                let mut best: Option<RayHit> = None;
                for &face in faces {
                    let Some(t) = mesh
                        .triangle(face)
                        .and_then(|tri| ray.intersect_triangle(&tri))
                    else {
                        continue;
                    };
                    // Equal distances keep the earlier face.
                    let closer = best.map_or(t <= max_distance, |h| t < h.distance);
                    if closer && accept(face) {
                        best = Some(RayHit {
                            distance: t,
                            face,
                            point: ray.at(t),
                        });
                    }
                }
                best
            }
            Self::Internal { left, right, .. } => {
                let (left, right): (&Self, &Self) = (left, right);
                // Nearest box first, so its hit can prune the farther one.
                let entry = |node: &Self| {
                    ray.intersect_aabb(node.bounds())
                        .map_or(f64::INFINITY, |(t, _)| t)
                };
                let right_first = entry(right) < entry(left);
                let (near, far) = if right_first { (right, left) } else { (left, right) };

                let hit_near = near.closest_hit(ray, mesh, max_distance, accept);
                let limit = hit_near.map_or(max_distance, |h| h.distance);
                let hit_far = far.closest_hit(ray, mesh, limit, accept);

                // Ties still go to the left subtree.
                let (hit_left, hit_right) = if right_first {
                    (hit_far, hit_near)
                } else {
                    (hit_near, hit_far)
                };
                match (hit_left, hit_right) {
                    (Some(l), Some(r)) => Some(if l.distance <= r.distance { l } else { r }),
                    (Some(h), None) | (None, Some(h)) => Some(h),
                    (None, None) => None,
                }
            }
        }
    }
}
