//! Axis-aligned bounding box trees for broad-phase collision queries.

use mmesh_core::geometry::{point_in_triangle, Aabb, Point};
use mmesh_core::Mesh;

#[derive(Debug, Clone)]
enum Node {
    Leaf { bbox: Aabb, entity: usize },
    Branch { bbox: Aabb, left: usize, right: usize },
}

impl Node {
    fn bbox(&self) -> &Aabb {
        match self {
            Node::Leaf { bbox, .. } | Node::Branch { bbox, .. } => bbox,
        }
    }
}

/// A binary tree of entity bounding boxes, split at the median along the
/// longest axis.
#[derive(Debug, Clone, Default)]
pub struct BoundingBoxTree {
    nodes: Vec<Node>,
    root: Option<usize>,
    len: usize,
}

impl BoundingBoxTree {
    pub fn new(boxes: &[Aabb]) -> Self {
        let mut tree = BoundingBoxTree {
            nodes: Vec::with_capacity(2 * boxes.len()),
            root: None,
            len: boxes.len(),
        };
        if !boxes.is_empty() {
            let mut ids: Vec<usize> = (0..boxes.len()).collect();
            tree.root = Some(tree.build_recursive(boxes, &mut ids));
        }
        tree
    }

    /// Tree over the cells of `mesh`.
    pub fn for_cells(mesh: &Mesh) -> Self {
        let boxes: Vec<Aabb> = (0..mesh.num_cells()).map(|c| mesh.bounding_box(c)).collect();
        Self::new(&boxes)
    }

    /// Tree over the boundary facets of `mesh`, indexed like `mesh.boundary_facets()`.
    pub fn for_boundary(mesh: &Mesh) -> Self {
        let boxes: Vec<Aabb> = mesh
            .boundary_facets()
            .iter()
            .map(|f| {
                let (a, b) = mesh.facet_points(f);
                Aabb::from_points(&[a, b])
            })
            .collect();
        Self::new(&boxes)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn build_recursive(&mut self, boxes: &[Aabb], ids: &mut [usize]) -> usize {
        if let [entity] = ids {
            self.nodes.push(Node::Leaf { bbox: boxes[*entity], entity: *entity });
            return self.nodes.len() - 1;
        }

        let bbox = ids
            .iter()
            .skip(1)
            .fold(boxes[ids[0]], |acc, &i| acc.union(&boxes[i]));
        let extent = bbox.extent();
        let along_x = extent.x >= extent.y;
        ids.sort_by(|&a, &b| {
            let (ca, cb) = (boxes[a].center(), boxes[b].center());
            if along_x {
                ca.x.total_cmp(&cb.x).then(a.cmp(&b))
            } else {
                ca.y.total_cmp(&cb.y).then(a.cmp(&b))
            }
        });

        let mid = ids.len() / 2;
        let (lo, hi) = ids.split_at_mut(mid);
        let left = self.build_recursive(boxes, lo);
        let right = self.build_recursive(boxes, hi);
        self.nodes.push(Node::Branch { bbox, left, right });
        self.nodes.len() - 1
    }

    /// Entities whose bounding box intersects `query`, ascending.
    pub fn compute_collisions(&self, query: &Aabb, tol: f64) -> Vec<usize> {
        let mut out = Vec::new();
        let Some(root) = self.root else {
            return out;
        };

        let mut stack = vec![root];
        while let Some(n) = stack.pop() {
            let node = &self.nodes[n];
            if !node.bbox().intersects(query, tol) {
                continue;
            }
            match node {
                Node::Leaf { entity, .. } => out.push(*entity),
                Node::Branch { left, right, .. } => {
                    stack.push(*left);
                    stack.push(*right);
                }
            }
        }
        out.sort_unstable();
        out
    }

    /// Entities whose bounding box contains `p`, ascending.
    pub fn compute_point_collisions(&self, p: Point, tol: f64) -> Vec<usize> {
        self.compute_collisions(&Aabb { min: p, max: p }, tol)
    }

    /// Cells of `mesh` (the mesh this tree was built from) containing `p`.
    pub fn compute_entity_collisions(&self, mesh: &Mesh, p: Point, tol: f64) -> Vec<usize> {
        self.compute_point_collisions(p, tol)
            .into_iter()
            .filter(|&c| point_in_triangle(p, &mesh.cell_points(c), tol))
            .collect()
    }

    /// Whether any cell of `mesh` contains `p`.
    pub fn collides_entity(&self, mesh: &Mesh, p: Point, tol: f64) -> bool {
        self.compute_point_collisions(p, tol)
            .into_iter()
            .any(|c| point_in_triangle(p, &mesh.cell_points(c), tol))
    }
}
