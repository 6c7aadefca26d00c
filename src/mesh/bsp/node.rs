//! BSP tree node data structure and the clipping operations booleans are built from

use crate::mesh::bsp::plane::Plane;
use crate::mesh::bsp::polygon::Polygon;
use crate::mesh::bsp::traits::SplittingPlaneStrategy;

/// A BSP tree node, containing polygons plus optional front/back subtrees
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Splitting plane for this node *or* **None** for a leaf that
    /// only stores polygons.
    pub plane: Option<Plane>,

    /// Polygons in *front* half-spaces.
    pub front: Option<Box<Node>>,

    /// Polygons in *back* half-spaces.
    pub back: Option<Box<Node>>,

    /// Polygons that lie *exactly* on `plane`
    /// (after the node has been built).
    pub polygons: Vec<Polygon>,
}

impl Node {
    /// Create a new empty BSP node
    pub const fn new() -> Self {
        Self {
            plane: None,
            front: None,
            back: None,
            polygons: Vec::new(),
        }
    }

    /// Creates a new BSP node from polygons
    pub fn from_polygons(polygons: &[Polygon], strategy: &dyn SplittingPlaneStrategy) -> Self {
        let mut node = Self::new();
        node.build(polygons, strategy);
        node
    }

    /// Convert solid space to empty space and empty space to solid space.
    pub fn invert(&mut self) {
        let mut stack = vec![self];

        while let Some(current) = stack.pop() {
            current.polygons.iter_mut().for_each(Polygon::flip);
            if let Some(plane) = current.plane.as_mut() {
                plane.flip();
            }

            std::mem::swap(&mut current.front, &mut current.back);

            if let Some(front) = current.front.as_deref_mut() {
                stack.push(front);
            }
            if let Some(back) = current.back.as_deref_mut() {
                stack.push(back);
            }
        }
    }

    /// Remove every part of `polygons` that lies inside this tree's solid.
    pub fn clip_polygons(&self, polygons: &[Polygon]) -> Vec<Polygon> {
        let Some(plane) = &self.plane else {
            return polygons.to_vec();
        };

        let mut front_polys = Vec::with_capacity(polygons.len());
        let mut back_polys = Vec::with_capacity(polygons.len());

        for polygon in polygons {
            let (coplanar_front, coplanar_back, front_parts, back_parts) =
                plane.split_polygon(polygon);
            front_polys.extend(coplanar_front);
            front_polys.extend(front_parts);
            back_polys.extend(coplanar_back);
            back_polys.extend(back_parts);
        }

        let mut result = match &self.front {
            Some(front_node) => front_node.clip_polygons(&front_polys),
            None => front_polys,
        };

        // Behind a leaf plane is solid: drop what ends up there.
        if let Some(back_node) = &self.back {
            result.extend(back_node.clip_polygons(&back_polys));
        }

        result
    }

    /// Remove all polygons in this tree that are inside the other tree.
    pub fn clip_to(&mut self, bsp: &Node) {
        let mut stack = vec![self];
        while let Some(current) = stack.pop() {
            current.polygons = bsp.clip_polygons(&current.polygons);
            if let Some(front) = current.front.as_deref_mut() {
                stack.push(front);
            }
            if let Some(back) = current.back.as_deref_mut() {
                stack.push(back);
            }
        }
    }

    /// Return all polygons in this tree
    pub fn all_polygons(&self) -> Vec<Polygon> {
        let mut result = Vec::new();
        let mut stack = vec![self];

        while let Some(current) = stack.pop() {
            result.extend_from_slice(&current.polygons);
            stack.extend(
                [&current.front, &current.back]
                    .into_iter()
                    .filter_map(|child| child.as_deref()),
            );
        }
        result
    }

    /// Insert `polygons` into the tree, splitting them by existing planes and
    /// growing new nodes where they land in empty children.
    pub fn build(&mut self, polygons: &[Polygon], strategy: &dyn SplittingPlaneStrategy) {
        if polygons.is_empty() {
            return;
        }

        let plane = self
            .plane
            .get_or_insert_with(|| strategy.pick_best_splitting_plane(polygons))
            .clone();

        let mut front = Vec::with_capacity(polygons.len() / 2);
        let mut back = Vec::with_capacity(polygons.len() / 2);

        for polygon in polygons {
            let (coplanar_front, coplanar_back, front_parts, back_parts) =
                plane.split_polygon(polygon);
            self.polygons.extend(coplanar_front);
            self.polygons.extend(coplanar_back);
            front.extend(front_parts);
            back.extend(back_parts);
        }

        if !front.is_empty() {
            self.front
                .get_or_insert_with(|| Box::new(Node::new()))
                .build(&front, strategy);
        }

        if !back.is_empty() {
            self.back
                .get_or_insert_with(|| Box::new(Node::new()))
                .build(&back, strategy);
        }
    }
}
