//! # Barnes–Hut Quadtree (2D)
//!
//! A **2D Barnes–Hut quadtree** for approximating the gravitational force on
//! every body of an `N`-body system in `O(N log N)` instead of the `O(N²)`
//! all-pairs sum.
//!
//! ## Core Concepts
//!
//! - Space is recursively split into 4 square quadrants (NW, NE, SW, SE).
//! - Each quadrant is one node of the tree, stored in a flat arena and
//!   addressed by index; children are indices, never owned boxes.
//! - A node is `Empty`, a `Leaf` holding one body index, or `Internal`
//!   holding four children plus the total mass and center of mass of its
//!   subtree.
//! - Aggregates are updated incrementally on insertion, so the tree is ready
//!   for traversal as soon as the last body is inserted.
//!
//! The tree never copies bodies: leaves hold indices into the shared body
//! array and positions are read through [`BodySource`].
//!
//! The whole tree is rebuilt every step. [`QuadTree::reset`] keeps the arena
//! allocation, so steady-state steps do not allocate.

use crate::simulation::errors::SimError;
use crate::simulation::forces::pairwise_force;
use crate::simulation::params::Settings;
use crate::simulation::quadrant::Quadrant;
use crate::simulation::states::{BodySource, NVec2};

/// State of a single quadtree node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    /// No body in this region
    Empty,
    /// Exactly one body, by index into the body array
    Leaf(usize),
    /// Four children (NW, NE, SW, SE) plus the subtree aggregate
    Internal {
        children: [usize; 4],
        mass: f64,
        com: NVec2,
    },
}

/// One node of the arena: its region and its state.
#[derive(Debug, Clone, Copy)]
pub struct QuadNode {
    pub quadrant: Quadrant,
    pub kind: NodeKind,
}

impl QuadNode {
    fn empty(quadrant: Quadrant) -> Self {
        Self { quadrant, kind: NodeKind::Empty }
    }
}

/// Arena-backed quadtree. Node `0` is always the root.
#[derive(Debug, Clone)]
pub struct QuadTree {
    nodes: Vec<QuadNode>,
}

const ROOT: usize = 0;

impl Default for QuadTree {
    fn default() -> Self {
        Self::new(Quadrant::new(0.0, 0.0, 1.0))
    }
}

impl QuadTree {
    /// Tree with a single empty root covering `quadrant`
    pub fn new(quadrant: Quadrant) -> Self {
        Self { nodes: vec![QuadNode::empty(quadrant)] }
    }

    /// Drop every node and start over with an empty root covering `quadrant`.
    pub fn reset(&mut self, quadrant: Quadrant) {
        self.nodes.clear();
        self.nodes.push(QuadNode::empty(quadrant));
    }

    /// Build phase of one step.
    ///
    /// Computes the enclosing root quadrant, resets the tree and inserts all
    /// bodies in index order. A body that ends up outside the root (only
    /// possible for non-finite positions) aborts the build.
    pub fn rebuild<S: BodySource + ?Sized>(&mut self, src: &S, margin: f64) -> Result<(), SimError> {
        self.reset(Quadrant::enclosing(src, margin));

        for i in 0..src.len() {
            if !self.insert(i, src)? {
                return Err(SimError::BodyOutsideDomain { index: i });
            }
        }

        Ok(())
    }

    /// Insert body `body_idx` starting at the root.
    ///
    /// Returns `Ok(false)` and leaves the tree untouched when the body lies
    /// outside the root quadrant. Two bodies at exactly the same position
    /// cannot be separated by subdivision and are reported as
    /// [`SimError::CoincidentBodies`].
    pub fn insert<S: BodySource + ?Sized>(&mut self, body_idx: usize, src: &S) -> Result<bool, SimError> {
        if !self.nodes[ROOT].quadrant.contains(src.position(body_idx)) {
            return Ok(false);
        }
        self.insert_at(ROOT, body_idx, src)?;
        Ok(true)
    }

    /// Root node
    pub fn root(&self) -> &QuadNode {
        &self.nodes[ROOT]
    }

    pub fn node(&self, idx: usize) -> &QuadNode {
        &self.nodes[idx]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Body indices held by leaves, in arena order
    pub fn leaf_bodies(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.iter().filter_map(|n| match n.kind {
            NodeKind::Leaf(b) => Some(b),
            _ => None,
        })
    }

    /// Total mass and center of mass of the whole tree.
    ///
    /// `None` for an empty tree.
    pub fn aggregate<S: BodySource + ?Sized>(&self, src: &S) -> Option<(f64, NVec2)> {
        match self.nodes[ROOT].kind {
            NodeKind::Empty => None,
            NodeKind::Leaf(b) => Some((src.mass(b), src.position(b))),
            NodeKind::Internal { mass, com, .. } => Some((mass, com)),
        }
    }

    /// Approximate gravitational force on body `target`.
    ///
    /// - leaf with another body: exact pairwise force,
    /// - internal node with `width / distance < theta`: one force from the
    ///   aggregate mass at the center of mass,
    /// - otherwise descend into all four children.
    ///
    /// `theta = 0` never approximates and reproduces the exact sum.
    pub fn compute_force<S: BodySource + ?Sized>(&self, target: usize, src: &S, settings: &Settings) -> NVec2 {
        let query = ForceQuery {
            target,
            x: src.position(target),
            m: src.mass(target),
            g: settings.g,
            eps2: settings.softening,
            theta: settings.theta,
        };

        let mut f = NVec2::zeros();
        self.accumulate(ROOT, &query, src, &mut f);
        f
    }

    // helpers ==============================================================================

    /// Insert into the subtree at `node_idx`; the caller has already
    /// established that the body belongs to this node's region.
    fn insert_at<S: BodySource + ?Sized>(&mut self, node_idx: usize, body_idx: usize, src: &S) -> Result<(), SimError> {
        let pos = src.position(body_idx);

        match self.nodes[node_idx].kind {
            NodeKind::Empty => {
                self.nodes[node_idx].kind = NodeKind::Leaf(body_idx);
                Ok(())
            }
            NodeKind::Internal { children, mass, com } => {
                let m = src.mass(body_idx);
                let total = mass + m;
                self.nodes[node_idx].kind = NodeKind::Internal {
                    children,
                    mass: total,
                    com: (com * mass + pos * m) / total,
                };
                self.insert_into_child(node_idx, children, body_idx, src)
            }
            NodeKind::Leaf(existing) => {
                let existing_pos = src.position(existing);
                if existing_pos == pos || !self.nodes[node_idx].quadrant.is_divisible() {
                    return Err(SimError::CoincidentBodies { first: existing, second: body_idx });
                }

                let children = self.subdivide(node_idx);
                let (m_a, m_b) = (src.mass(existing), src.mass(body_idx));
                let total = m_a + m_b;
                self.nodes[node_idx].kind = NodeKind::Internal {
                    children,
                    mass: total,
                    com: (existing_pos * m_a + pos * m_b) / total,
                };

                self.insert_into_child(node_idx, children, existing, src)?;
                self.insert_into_child(node_idx, children, body_idx, src)
            }
        }
    }

    fn insert_into_child<S: BodySource + ?Sized>(&mut self, node_idx: usize, children: [usize; 4], body_idx: usize, src: &S) -> Result<(), SimError> {
        let slot = self.nodes[node_idx].quadrant.child_index(src.position(body_idx));
        self.insert_at(children[slot], body_idx, src)
    }

    /// Push four empty children quartering `node_idx` and return their indices.
    fn subdivide(&mut self, node_idx: usize) -> [usize; 4] {
        let first = self.nodes.len();
        for quadrant in self.nodes[node_idx].quadrant.subdivide() {
            self.nodes.push(QuadNode::empty(quadrant));
        }
        [first, first + 1, first + 2, first + 3]
    }

    fn accumulate<S: BodySource + ?Sized>(&self, node_idx: usize, q: &ForceQuery, src: &S, f: &mut NVec2) {
        let node = &self.nodes[node_idx];

        match node.kind {
            NodeKind::Empty => {}
            NodeKind::Leaf(b) => {
                if b != q.target {
                    *f += pairwise_force(q.x, q.m, src.position(b), src.mass(b), q.g, q.eps2);
                }
            }
            NodeKind::Internal { children, mass, com } => {
                let distance = (com - q.x).norm();
                // distance 0 gives an infinite ratio, so the node is opened
                let ratio = node.quadrant.width() / distance;

                if ratio < q.theta {
                    *f += pairwise_force(q.x, q.m, com, mass, q.g, q.eps2);
                } else {
                    for child in children {
                        self.accumulate(child, q, src, f);
                    }
                }
            }
        }
    }
}

/// Per-target constants threaded through the traversal
struct ForceQuery {
    target: usize,
    x: NVec2,
    m: f64,
    g: f64,
    eps2: f64,
    theta: f64,
}
