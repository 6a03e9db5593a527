//! # Dynamic AABB Tree
//!
//! Broad-phase index over moving rectangles.
//!
//! ## Layout
//!
//! Nodes live in one pooled array with a free list; links are `u32` indices.
//! Leaves carry a payload, the last reported (tight) bounds and a fattened
//! copy of them. Internal nodes carry the union of their children.
//!
//! ```text
//!             [A: fat = B ∪ C]
//!              /            \
//!       [B: leaf]        [C: fat = D ∪ E]
//!                          /         \
//!                    [D: leaf]     [E: leaf]
//! ```
//!
//! A leaf is only re-inserted when its new tight bounds escape its fat
//! bounds, so small movements cost one containment test.

use serde::{Deserialize, Serialize};
use tessera_shared::{Rect, Vec2, AABB_DISPLACEMENT_MULTIPLIER, AABB_MARGIN};
use tracing::{trace, warn};

use crate::error::{SpatialError, SpatialResult};

const NULL_NODE: u32 = u32::MAX;

// =============================================================================
// CONFIG / STATS
// =============================================================================

/// Tuning for leaf fattening.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Added to every side of a leaf's tight bounds.
    pub margin: f32,
    /// Scales the displacement used to stretch fat bounds along the motion.
    pub displacement_multiplier: f32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            margin: AABB_MARGIN,
            displacement_multiplier: AABB_DISPLACEMENT_MULTIPLIER,
        }
    }
}

impl TreeConfig {
    /// Returns this config with every non-finite or negative field replaced
    /// by its default. Fat bounds must always contain tight bounds.
    #[must_use]
    pub fn validated(self) -> Self {
        let defaults = Self::default();
        let sane = |value: f32| value.is_finite() && value >= 0.0;
        let mut config = self;
        if !sane(config.margin) {
            warn!(margin = config.margin, "invalid tree margin, using default");
            config.margin = defaults.margin;
        }
        if !sane(config.displacement_multiplier) {
            warn!(
                multiplier = config.displacement_multiplier,
                "invalid displacement multiplier, using default"
            );
            config.displacement_multiplier = defaults.displacement_multiplier;
        }
        config
    }
}

/// Structural counters, useful to verify that small moves stay cheap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Proxies inserted.
    pub insertions: u64,
    /// Proxies removed.
    pub removals: u64,
    /// Moves that escaped the fat bounds and rebuilt the leaf's position.
    pub reinsertions: u64,
    /// Balancing rotations performed.
    pub rotations: u64,
}

// =============================================================================
// NODES
// =============================================================================

/// Handle to a leaf of a [`DynamicAabbTree`].
///
/// The generation detects handles to leaves that were removed and whose node
/// has since been reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProxyId {
    index: u32,
    generation: u32,
}

impl ProxyId {
    /// Node index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }
}

struct Node<T> {
    fat: Rect,
    tight: Rect,
    parent: u32,
    left: u32,
    right: u32,
    /// Leaf = 0, free = -1.
    height: i32,
    generation: u32,
    payload: Option<T>,
}

impl<T> Node<T> {
    #[inline]
    fn is_leaf(&self) -> bool {
        self.left == NULL_NODE
    }
}

// =============================================================================
// TREE
// =============================================================================

/// Bounding volume hierarchy over rectangles with payload `T`.
///
/// # Example
///
/// ```rust,ignore
/// let mut tree = DynamicAabbTree::new(TreeConfig::default());
/// let id = tree.insert(Rect::from_min_max(10.0, 10.0, 20.0, 20.0), "crate")?;
///
/// tree.query(&Rect::from_min_max(0.0, 0.0, 15.0, 15.0), |_, name| {
///     println!("{name}");
///     true
/// });
/// ```
pub struct DynamicAabbTree<T> {
    nodes: Vec<Node<T>>,
    free_list: Vec<u32>,
    root: u32,
    proxy_count: usize,
    config: TreeConfig,
    stats: TreeStats,
}

impl<T> DynamicAabbTree<T> {
    /// Creates an empty tree.
    #[must_use]
    pub fn new(config: TreeConfig) -> Self {
        Self::with_capacity(config, 0)
    }

    /// Creates an empty tree with room for `proxies` leaves.
    ///
    /// The config passes through [`TreeConfig::validated`].
    #[must_use]
    pub fn with_capacity(config: TreeConfig, proxies: usize) -> Self {
        // A full binary tree with n leaves has 2n - 1 nodes.
        let nodes = proxies.saturating_mul(2);
        Self {
            nodes: Vec::with_capacity(nodes),
            free_list: Vec::with_capacity(nodes),
            root: NULL_NODE,
            proxy_count: 0,
            config: config.validated(),
            stats: TreeStats::default(),
        }
    }

    /// Fattening parameters.
    #[must_use]
    pub const fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Structural counters since creation or the last [`reset_stats`](Self::reset_stats).
    #[must_use]
    pub const fn stats(&self) -> TreeStats {
        self.stats
    }

    /// Zeroes the structural counters.
    pub fn reset_stats(&mut self) {
        self.stats = TreeStats::default();
    }

    /// Number of proxies.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.proxy_count
    }

    /// True when the tree holds no proxy.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.proxy_count == 0
    }

    /// Height of the root; 0 for an empty tree or a single leaf.
    #[must_use]
    pub fn height(&self) -> u32 {
        if self.root == NULL_NODE {
            return 0;
        }
        self.nodes[self.root as usize].height as u32
    }

    /// Checks whether `id` still refers to a live proxy.
    #[must_use]
    pub fn contains(&self, id: ProxyId) -> bool {
        self.leaf(id).is_some()
    }

    /// Payload of a live proxy.
    #[must_use]
    pub fn payload(&self, id: ProxyId) -> Option<&T> {
        self.leaf(id)?.payload.as_ref()
    }

    /// Fattened bounds of a live proxy.
    #[must_use]
    pub fn fat_bounds(&self, id: ProxyId) -> Option<Rect> {
        self.leaf(id).map(|node| node.fat)
    }

    /// Last reported bounds of a live proxy.
    #[must_use]
    pub fn tight_bounds(&self, id: ProxyId) -> Option<Rect> {
        self.leaf(id).map(|node| node.tight)
    }

    /// Iterates over every live proxy in node order.
    pub fn proxies(&self) -> impl Iterator<Item = (ProxyId, &T)> + '_ {
        self.nodes.iter().enumerate().filter_map(|(index, node)| {
            let payload = node.payload.as_ref()?;
            let id = ProxyId {
                index: index as u32,
                generation: node.generation,
            };
            Some((id, payload))
        })
    }

    fn leaf(&self, id: ProxyId) -> Option<&Node<T>> {
        self.nodes
            .get(id.index as usize)
            .filter(|node| node.generation == id.generation && node.payload.is_some())
    }

    fn expect_leaf(&self, id: ProxyId) -> usize {
        if self.leaf(id).is_none() {
            panic!("proxy {id:?} is not live in this tree");
        }
        id.index as usize
    }

    // =========================================================================
    // Node Pool
    // =========================================================================

    fn allocate_node(&mut self, fat: Rect) -> u32 {
        if let Some(index) = self.free_list.pop() {
            let node = &mut self.nodes[index as usize];
            node.fat = fat;
            node.tight = fat;
            node.parent = NULL_NODE;
            node.left = NULL_NODE;
            node.right = NULL_NODE;
            node.height = 0;
            return index;
        }

        let index = u32::try_from(self.nodes.len())
            .ok()
            .filter(|&i| i != NULL_NODE)
            .unwrap_or_else(|| panic!("AABB tree node space exhausted"));
        self.nodes.push(Node {
            fat,
            tight: fat,
            parent: NULL_NODE,
            left: NULL_NODE,
            right: NULL_NODE,
            height: 0,
            generation: 0,
            payload: None,
        });
        index
    }

    fn free_node(&mut self, index: u32) -> Option<T> {
        let node = &mut self.nodes[index as usize];
        node.height = -1;
        node.parent = NULL_NODE;
        node.generation = node.generation.wrapping_add(1);
        let payload = node.payload.take();
        self.free_list.push(index);
        payload
    }

    // =========================================================================
    // Proxy API
    // =========================================================================

    /// Inserts a proxy with the given tight bounds.
    ///
    /// # Errors
    ///
    /// [`SpatialError::DegenerateBounds`] if `bounds` is not finite with
    /// positive width and height.
    pub fn insert(&mut self, bounds: Rect, payload: T) -> SpatialResult<ProxyId> {
        if !bounds.is_proper() {
            return Err(SpatialError::DegenerateBounds(bounds));
        }

        let leaf = self.allocate_node(bounds.expanded(self.config.margin));
        let node = &mut self.nodes[leaf as usize];
        node.tight = bounds;
        node.payload = Some(payload);
        let id = ProxyId {
            index: leaf,
            generation: node.generation,
        };

        self.insert_leaf(leaf);
        self.proxy_count += 1;
        self.stats.insertions += 1;
        Ok(id)
    }

    /// Removes a proxy and returns its payload.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    pub fn remove_proxy(&mut self, id: ProxyId) -> T {
        let leaf = self.expect_leaf(id) as u32;
        self.remove_leaf(leaf);
        self.proxy_count -= 1;
        self.stats.removals += 1;
        match self.free_node(leaf) {
            Some(payload) => payload,
            None => unreachable!("live leaf {leaf} had no payload"),
        }
    }

    /// Updates a proxy's tight bounds after its owner moved by `displacement`.
    ///
    /// Returns `Ok(false)` when the new bounds still fit inside the fat bounds;
    /// the tree structure is untouched. Otherwise the leaf is re-inserted with
    /// fat bounds stretched along the displacement and `Ok(true)` is returned.
    ///
    /// # Errors
    ///
    /// [`SpatialError::DegenerateBounds`] if `bounds` is not proper.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    pub fn move_proxy(
        &mut self,
        id: ProxyId,
        bounds: Rect,
        displacement: Vec2,
    ) -> SpatialResult<bool> {
        if !bounds.is_proper() {
            return Err(SpatialError::DegenerateBounds(bounds));
        }
        let leaf = self.expect_leaf(id);

        self.nodes[leaf].tight = bounds;
        if self.nodes[leaf].fat.contains(&bounds) {
            return Ok(false);
        }

        let displacement = if displacement.is_finite() {
            displacement * self.config.displacement_multiplier
        } else {
            Vec2::ZERO
        };
        let fat = bounds
            .expanded(self.config.margin)
            .extended_by(displacement);

        self.remove_leaf(leaf as u32);
        self.nodes[leaf].fat = fat;
        self.insert_leaf(leaf as u32);
        self.stats.reinsertions += 1;
        trace!(proxy = leaf, "proxy reinserted");
        Ok(true)
    }

    /// Removes every proxy. Outstanding ids become stale.
    pub fn clear(&mut self) {
        self.free_list.clear();
        for index in (0..self.nodes.len()).rev() {
            let node = &mut self.nodes[index];
            node.height = -1;
            node.parent = NULL_NODE;
            node.left = NULL_NODE;
            node.right = NULL_NODE;
            node.generation = node.generation.wrapping_add(1);
            node.payload = None;
            self.free_list.push(index as u32);
        }
        self.root = NULL_NODE;
        self.proxy_count = 0;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Visits every proxy whose fat bounds overlap `region`.
    ///
    /// The visitor returns `false` to stop the query immediately. Proxies whose
    /// fat bounds overlap but tight bounds do not may be visited; use
    /// [`query_tight`](Self::query_tight) for an exact result.
    pub fn query<F>(&self, region: &Rect, mut visitor: F)
    where
        F: FnMut(ProxyId, &T) -> bool,
    {
        if self.root == NULL_NODE {
            return;
        }

        let mut stack = Vec::with_capacity(64);
        stack.push(self.root);
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index as usize];
            if !node.fat.overlaps(region) {
                continue;
            }

            if node.is_leaf() {
                let Some(payload) = node.payload.as_ref() else {
                    continue;
                };
                let id = ProxyId {
                    index,
                    generation: node.generation,
                };
                if !visitor(id, payload) {
                    return;
                }
            } else {
                stack.push(node.left);
                stack.push(node.right);
            }
        }
    }

    /// Visits every proxy whose tight bounds overlap `region`.
    pub fn query_tight<F>(&self, region: &Rect, mut visitor: F)
    where
        F: FnMut(ProxyId, &T) -> bool,
    {
        self.query(region, |id, payload| {
            let tight = self.nodes[id.index as usize].tight;
            if tight.overlaps(region) {
                visitor(id, payload)
            } else {
                true
            }
        });
    }

    // =========================================================================
    // Structure
    // =========================================================================

    fn insert_leaf(&mut self, leaf: u32) {
        if self.root == NULL_NODE {
            self.root = leaf;
            self.nodes[leaf as usize].parent = NULL_NODE;
            return;
        }

        // Find the best sibling by descending along the cheapest perimeter growth.
        let leaf_fat = self.nodes[leaf as usize].fat;
        let mut index = self.root;
        while !self.nodes[index as usize].is_leaf() {
            let node = &self.nodes[index as usize];
            let (left, right) = (node.left, node.right);

            let perimeter = node.fat.perimeter();
            let combined = node.fat.union(&leaf_fat).perimeter();

            // Cost of pairing the new leaf with this node.
            let cost = 2.0 * combined;
            // Minimum cost pushed down to either child.
            let inheritance = 2.0 * (combined - perimeter);

            let cost_left = self.descent_cost(left, &leaf_fat) + inheritance;
            let cost_right = self.descent_cost(right, &leaf_fat) + inheritance;

            if cost < cost_left && cost < cost_right {
                break;
            }
            index = if cost_left < cost_right { left } else { right };
        }

        let sibling = index;
        let old_parent = self.nodes[sibling as usize].parent;
        let sibling_fat = self.nodes[sibling as usize].fat;
        let sibling_height = self.nodes[sibling as usize].height;

        let new_parent = self.allocate_node(sibling_fat.union(&leaf_fat));
        {
            let node = &mut self.nodes[new_parent as usize];
            node.parent = old_parent;
            node.left = sibling;
            node.right = leaf;
            node.height = sibling_height + 1;
        }
        self.replace_child(old_parent, sibling, new_parent);
        self.nodes[sibling as usize].parent = new_parent;
        self.nodes[leaf as usize].parent = new_parent;

        self.refit_upwards(new_parent);
    }

    fn descent_cost(&self, child: u32, leaf_fat: &Rect) -> f32 {
        let node = &self.nodes[child as usize];
        let grown = node.fat.union(leaf_fat).perimeter();
        if node.is_leaf() {
            grown
        } else {
            grown - node.fat.perimeter()
        }
    }

    fn remove_leaf(&mut self, leaf: u32) {
        if leaf == self.root {
            self.root = NULL_NODE;
            return;
        }

        let parent = self.nodes[leaf as usize].parent;
        let grandparent = self.nodes[parent as usize].parent;
        let sibling = if self.nodes[parent as usize].left == leaf {
            self.nodes[parent as usize].right
        } else {
            self.nodes[parent as usize].left
        };

        self.replace_child(grandparent, parent, sibling);
        self.nodes[sibling as usize].parent = grandparent;
        self.nodes[leaf as usize].parent = NULL_NODE;
        self.free_node(parent);

        if grandparent != NULL_NODE {
            self.refit_upwards(grandparent);
        }
    }

    /// Points `parent`'s link to `old` at `new`; `NULL_NODE` parent means root.
    fn replace_child(&mut self, parent: u32, old: u32, new: u32) {
        if parent == NULL_NODE {
            self.root = new;
            return;
        }
        let node = &mut self.nodes[parent as usize];
        if node.left == old {
            node.left = new;
        } else {
            node.right = new;
        }
    }

    /// Recomputes height and bounds from `index` to the root, rebalancing.
    fn refit_upwards(&mut self, mut index: u32) {
        while index != NULL_NODE {
            index = self.balance(index);
            self.refit(index);
            index = self.nodes[index as usize].parent;
        }
    }

    fn refit(&mut self, index: u32) {
        let node = &self.nodes[index as usize];
        let (left, right) = (&self.nodes[node.left as usize], &self.nodes[node.right as usize]);
        let fat = left.fat.union(&right.fat);
        let height = 1 + left.height.max(right.height);

        let node = &mut self.nodes[index as usize];
        node.fat = fat;
        node.height = height;
    }

    /// Rotates the taller child of `a` up if the subtree is out of balance.
    /// Returns the index of the subtree's new root.
    fn balance(&mut self, a: u32) -> u32 {
        let node = &self.nodes[a as usize];
        if node.is_leaf() || node.height < 2 {
            return a;
        }

        let (b, c) = (node.left, node.right);
        let skew = self.nodes[c as usize].height - self.nodes[b as usize].height;
        if skew > 1 {
            self.rotate_up(a, c)
        } else if skew < -1 {
            self.rotate_up(a, b)
        } else {
            a
        }
    }

    /// Promotes child `up` of `a` into `a`'s place.
    ///
    /// `up` adopts `a` and its own taller child; `a` adopts `up`'s shorter child
    /// in the slot `up` vacated.
    fn rotate_up(&mut self, a: u32, up: u32) -> u32 {
        let (f, g) = (self.nodes[up as usize].left, self.nodes[up as usize].right);
        let (tall, short) = if self.nodes[f as usize].height > self.nodes[g as usize].height {
            (f, g)
        } else {
            (g, f)
        };

        let a_parent = self.nodes[a as usize].parent;
        {
            let node = &mut self.nodes[up as usize];
            node.left = a;
            node.right = tall;
            node.parent = a_parent;
        }
        self.replace_child(a_parent, a, up);

        {
            let node = &mut self.nodes[a as usize];
            node.parent = up;
            if node.left == up {
                node.left = short;
            } else {
                node.right = short;
            }
        }
        self.nodes[short as usize].parent = a;

        self.refit(a);
        self.refit(up);
        self.stats.rotations += 1;
        up
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Walks the whole tree and checks its structural invariants: links,
    /// heights, containment of children and of tight bounds, pool accounting.
    ///
    /// # Errors
    ///
    /// [`SpatialError::InvariantViolation`] naming the first bad node.
    pub fn validate(&self) -> SpatialResult<()> {
        let violation = |node: u32, reason: &'static str| {
            Err(SpatialError::InvariantViolation { node, reason })
        };

        let mut reachable = 0usize;
        let mut leaves = 0usize;
        if self.root != NULL_NODE {
            if self.nodes[self.root as usize].parent != NULL_NODE {
                return violation(self.root, "root has a parent");
            }

            let mut stack = vec![self.root];
            while let Some(index) = stack.pop() {
                reachable += 1;
                let node = &self.nodes[index as usize];
                if node.height < 0 {
                    return violation(index, "free node reachable from root");
                }

                if node.is_leaf() {
                    leaves += 1;
                    if node.height != 0 {
                        return violation(index, "leaf height is not zero");
                    }
                    if node.payload.is_none() {
                        return violation(index, "leaf without payload");
                    }
                    if !node.fat.contains(&node.tight) {
                        return violation(index, "fat bounds do not contain tight bounds");
                    }
                    continue;
                }

                if node.payload.is_some() {
                    return violation(index, "internal node with payload");
                }
                let (left, right) = (&self.nodes[node.left as usize], &self.nodes[node.right as usize]);
                if left.parent != index || right.parent != index {
                    return violation(index, "child does not point back to parent");
                }
                if node.height != 1 + left.height.max(right.height) {
                    return violation(index, "height is not 1 + max(child heights)");
                }
                if !node.fat.contains(&left.fat) || !node.fat.contains(&right.fat) {
                    return violation(index, "bounds do not contain children");
                }
                stack.push(node.left);
                stack.push(node.right);
            }
        }

        if leaves != self.proxy_count {
            return violation(self.root, "leaf count differs from proxy count");
        }
        if reachable + self.free_list.len() != self.nodes.len() {
            return violation(self.root, "nodes leaked from the pool");
        }
        Ok(())
    }
}
