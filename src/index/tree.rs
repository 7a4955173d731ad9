// =====================================================================
// File: index/tree.rs
//
// Description:
//   Implements the B+ tree index (`Tree`) that manages insertion,
//   search, deletion, and range lookup over keys and values stored as
//   `i64`. Nodes are held in an arena (see `node.rs`) and referenced by
//   `NodeId`, so parent/sibling back-references are plain indices
//   rather than owning pointers.
//
// Features:
//   - `insert`: adds a key-value pair, rejecting duplicates.
//   - `search`: point lookup.
//   - `delete`: removes a key, rebalancing via borrow or merge.
//   - `get_range`: returns the value of some key within an inclusive
//     range, not a list (see module docs in `mod.rs`).
//   - `check_invariants`: whole-tree validator used by tests.
//
// Notes:
//   * The minimum degree is expressed directly as `order` (max children
//     of an internal node) and `entries_cap` (max entries of a leaf),
//     matching how the keys/values are described at the boundary rather
//     than via a single branching-factor parameter.
//   * Internal node splits are implemented by physically inserting the
//     new child/key into the node first and then cutting the resulting
//     over-full array at a fixed midpoint `s = order / 2`. This collapses
//     three insert-position-dependent split variants into one
//     post-insertion split. For an insert landing exactly at the midpoint
//     this picks a different promoted key (and so a differently shaped,
//     still-valid tree) than treating that position as its own case would;
//     see DESIGN.md for the tradeoff.
// =====================================================================
use super::node::{key_search, Arena, InternalNode, LeafNode, Node, NodeId, NO_PARENT_KEY_IDX};
use crate::error::BPlusTreeError;

/// Hard ceiling on `order` a caller may request.
pub const O_MAX_HARD: usize = 256;
/// Hard ceiling on `entries_cap` a caller may request.
pub const E_MAX_HARD: usize = 512;

fn ceil_div(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

fn leaf_key_search(entries: &[(i64, i64)], target: i64) -> (usize, bool) {
    let idx = entries.partition_point(|&(k, _)| k < target);
    let found = idx < entries.len() && entries[idx].0 == target;
    (idx, found)
}

/// An in-memory B+ tree index mapping `i64` keys to `i64` values.
///
/// `order` bounds the number of children an internal node may have;
/// `entries_cap` bounds the number of key-value pairs a leaf may hold.
/// Both are fixed for the lifetime of the tree.
#[derive(Debug)]
pub struct Tree {
    order: usize,
    entries_cap: usize,
    level: usize,
    root: Option<NodeId>,
    first_leaf: Option<NodeId>,
    arena: Arena,
}

impl Tree {
    /// Creates a new, empty tree.
    ///
    /// # Arguments
    /// * `order` - maximum children per internal node, `3..=256`.
    /// * `entries_cap` - maximum entries per leaf, `1..=512`.
    ///
    /// # Panics
    /// Panics if either bound is out of range. Construction misuse is a
    /// programmer error, not a recoverable condition.
    ///
    /// # Example
    /// ```
    /// use bptree_index::index::Tree;
    /// let tree = Tree::new(3, 3);
    /// assert!(tree.is_empty());
    /// ```
    pub fn new(order: usize, entries_cap: usize) -> Self {
        assert!(
            (3..=O_MAX_HARD).contains(&order),
            "order must be in 3..={O_MAX_HARD}"
        );
        assert!(
            (1..=E_MAX_HARD).contains(&entries_cap),
            "entries_cap must be in 1..={E_MAX_HARD}"
        );
        Tree {
            order,
            entries_cap,
            level: 0,
            root: None,
            first_leaf: None,
            arena: Arena::new(),
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn entries_cap(&self) -> usize {
        self.entries_cap
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    // The split points below (`order/2` for internals, `⌈(entries_cap+1)/2⌉`
    // for leaves) divide an overfull node of `order+1` children or
    // `entries_cap+1` entries as evenly as the parity of `order`/`entries_cap`
    // allows. The minimum occupancy every such split actually guarantees on
    // its smaller side is `⌈order/2⌉` children / `⌈entries_cap/2⌉` entries —
    // one less than the naive `⌈(order+1)/2⌉` would demand, which is
    // unsatisfiable whenever `order` (or `entries_cap`) is even.
    fn min_children(&self) -> usize {
        ceil_div(self.order, 2)
    }

    fn leaf_split_point(&self) -> usize {
        ceil_div(self.entries_cap + 1, 2)
    }

    fn min_entries(&self) -> usize {
        ceil_div(self.entries_cap, 2)
    }

    /// Searches for `key`.
    ///
    /// # Example
    /// ```
    /// use bptree_index::index::Tree;
    /// let mut t = Tree::new(3, 3);
    /// t.insert(4, 40).unwrap();
    /// assert_eq!(t.search(4), Some(40));
    /// assert_eq!(t.search(5), None);
    /// ```
    pub fn search(&self, key: i64) -> Option<i64> {
        let root_id = self.root?;
        let leaf_id = self.descend_to_leaf(root_id, key);
        let leaf = self.arena.leaf(leaf_id);
        let (idx, found) = leaf_key_search(&leaf.entries, key);
        if found {
            Some(leaf.entries[idx].1)
        } else {
            None
        }
    }

    /// Inserts `(key, value)`. Rejects the key if already present.
    ///
    /// # Example
    /// ```
    /// use bptree_index::index::Tree;
    /// use bptree_index::error::BPlusTreeError;
    /// let mut t = Tree::new(3, 3);
    /// assert_eq!(t.insert(1, 10), Ok(()));
    /// assert_eq!(t.insert(1, 99), Err(BPlusTreeError::DuplicateKey(1)));
    /// ```
    pub fn insert(&mut self, key: i64, value: i64) -> Result<(), BPlusTreeError> {
        let Some(root_id) = self.root else {
            let leaf_id = self.alloc_leaf(vec![(key, value)]);
            self.root = Some(leaf_id);
            self.first_leaf = Some(leaf_id);
            self.level = 1;
            log::debug!("created root leaf, first key {key}");
            return Ok(());
        };

        let leaf_id = self.descend_to_leaf(root_id, key);
        let (idx, found) = leaf_key_search(&self.arena.leaf(leaf_id).entries, key);
        if found {
            return Err(BPlusTreeError::DuplicateKey(key));
        }

        if self.arena.leaf(leaf_id).entries.len() < self.entries_cap {
            self.arena.leaf_mut(leaf_id).entries.insert(idx, (key, value));
        } else {
            self.split_leaf_and_insert(leaf_id, idx, key, value);
        }
        Ok(())
    }

    /// Deletes `key`, rebalancing via borrow or merge if the owning leaf
    /// underflows.
    ///
    /// # Example
    /// ```
    /// use bptree_index::index::Tree;
    /// let mut t = Tree::new(3, 3);
    /// t.insert(1, 10).unwrap();
    /// assert_eq!(t.delete(1), Ok(()));
    /// assert_eq!(t.search(1), None);
    /// ```
    pub fn delete(&mut self, key: i64) -> Result<(), BPlusTreeError> {
        let root_id = self.root.ok_or(BPlusTreeError::KeyNotFound(key))?;
        let leaf_id = self.descend_to_leaf(root_id, key);
        let (idx, found) = leaf_key_search(&self.arena.leaf(leaf_id).entries, key);
        if !found {
            return Err(BPlusTreeError::KeyNotFound(key));
        }
        self.arena.leaf_mut(leaf_id).entries.remove(idx);
        self.rebalance_leaf(leaf_id);
        Ok(())
    }

    /// Returns the value of some key within the inclusive range
    /// `[min(k1,k2), max(k1,k2)]`, or `None` if no such key exists. This
    /// deliberately does not return a list of matches.
    pub fn get_range(&self, k1: i64, k2: i64) -> Option<i64> {
        let (lo, hi) = if k1 <= k2 { (k1, k2) } else { (k2, k1) };
        let root_id = self.root?;
        let start_id = self.descend_to_leaf(root_id, lo);
        let mut leaf_id = start_id;
        loop {
            let leaf = self.arena.leaf(leaf_id);
            for &(k, v) in &leaf.entries {
                if k > hi {
                    return None;
                }
                if k >= lo {
                    return Some(v);
                }
            }
            let next_id = leaf.next;
            if next_id == start_id {
                return None;
            }
            leaf_id = next_id;
        }
    }

    fn descend_to_leaf(&self, mut id: NodeId, key: i64) -> NodeId {
        loop {
            match self.arena.get(id) {
                Node::Leaf(_) => return id,
                Node::Internal(n) => {
                    let (idx, found) = key_search(&n.keys, key);
                    id = n.children[if found { idx + 1 } else { idx }];
                }
            }
        }
    }

    // =========================
    // Arena helpers
    // =========================

    fn alloc_leaf(&mut self, entries: Vec<(i64, i64)>) -> NodeId {
        let id = self.arena.alloc(Node::Leaf(LeafNode {
            parent: None,
            parent_key_idx: NO_PARENT_KEY_IDX,
            entries,
            prev: NodeId(0),
            next: NodeId(0),
        }));
        self.arena.leaf_mut(id).prev = id;
        self.arena.leaf_mut(id).next = id;
        id
    }

    fn alloc_internal(&mut self, keys: Vec<i64>, children: Vec<NodeId>) -> NodeId {
        let id = self.arena.alloc(Node::Internal(InternalNode {
            parent: None,
            parent_key_idx: NO_PARENT_KEY_IDX,
            keys,
            children,
            prev: NodeId(0),
            next: NodeId(0),
        }));
        self.arena.internal_mut(id).prev = id;
        self.arena.internal_mut(id).next = id;
        id
    }

    fn link_leaf_after(&mut self, new_id: NodeId, after_id: NodeId) {
        let next_id = self.arena.leaf(after_id).next;
        self.arena.leaf_mut(after_id).next = new_id;
        self.arena.leaf_mut(new_id).prev = after_id;
        self.arena.leaf_mut(new_id).next = next_id;
        self.arena.leaf_mut(next_id).prev = new_id;
    }

    fn link_leaf_before(&mut self, new_id: NodeId, before_id: NodeId) {
        let prev_id = self.arena.leaf(before_id).prev;
        self.arena.leaf_mut(before_id).prev = new_id;
        self.arena.leaf_mut(new_id).next = before_id;
        self.arena.leaf_mut(new_id).prev = prev_id;
        self.arena.leaf_mut(prev_id).next = new_id;
        if self.first_leaf == Some(before_id) {
            self.first_leaf = Some(new_id);
        }
    }

    fn unlink_leaf(&mut self, id: NodeId) {
        let prev_id = self.arena.leaf(id).prev;
        let next_id = self.arena.leaf(id).next;
        self.arena.leaf_mut(prev_id).next = next_id;
        self.arena.leaf_mut(next_id).prev = prev_id;
        if self.first_leaf == Some(id) {
            self.first_leaf = if next_id == id { None } else { Some(next_id) };
        }
    }

    fn link_internal_after(&mut self, new_id: NodeId, after_id: NodeId) {
        let next_id = self.arena.internal(after_id).next;
        self.arena.internal_mut(after_id).next = new_id;
        self.arena.internal_mut(new_id).prev = after_id;
        self.arena.internal_mut(new_id).next = next_id;
        self.arena.internal_mut(next_id).prev = new_id;
    }

    fn unlink_internal(&mut self, id: NodeId) {
        let prev_id = self.arena.internal(id).prev;
        let next_id = self.arena.internal(id).next;
        self.arena.internal_mut(prev_id).next = next_id;
        self.arena.internal_mut(next_id).prev = prev_id;
    }

    fn renumber_children(&mut self, parent_id: NodeId) {
        let child_ids: Vec<NodeId> = self.arena.internal(parent_id).children.clone();
        for (i, &cid) in child_ids.iter().enumerate() {
            self.arena.get_mut(cid).set_parent(Some(parent_id), i as isize - 1);
        }
    }

    // =========================
    // Split path (insert)
    // =========================

    fn split_leaf_and_insert(&mut self, leaf_id: NodeId, insert_pos: usize, key: i64, value: i64) {
        let split = self.leaf_split_point();
        let old_parent = self.arena.leaf(leaf_id).parent;
        let old_parent_key_idx = self.arena.leaf(leaf_id).parent_key_idx;

        let mut combined = std::mem::take(&mut self.arena.leaf_mut(leaf_id).entries);
        combined.insert(insert_pos, (key, value));

        let (left_id, right_id);
        if insert_pos < split {
            // splitLeft: new sibling takes the lower half and becomes the
            // left neighbor; leaf_id keeps its identity and the upper half.
            let upper = combined.split_off(split);
            let new_id = self.alloc_leaf(combined);
            self.arena.leaf_mut(leaf_id).entries = upper;
            self.link_leaf_before(new_id, leaf_id);
            left_id = new_id;
            right_id = leaf_id;
        } else {
            // splitRight: new sibling takes the upper half.
            let upper = combined.split_off(split);
            self.arena.leaf_mut(leaf_id).entries = combined;
            let new_id = self.alloc_leaf(upper);
            self.link_leaf_after(new_id, leaf_id);
            left_id = leaf_id;
            right_id = new_id;
        }

        let promoted = self.arena.leaf(right_id).entries[0].0;
        log::trace!("leaf split promotes key {promoted}");
        self.propagate_split(old_parent, old_parent_key_idx, left_id, right_id, promoted);
    }

    /// Installs `left_id`/`right_id` as replacements for the single node
    /// that used to occupy `old_parent`'s child slot, with `sep_key`
    /// between them. Creates a new root if there was no parent, and
    /// cascades into a further internal split if the parent overflows.
    fn propagate_split(
        &mut self,
        old_parent: Option<NodeId>,
        old_parent_key_idx: isize,
        left_id: NodeId,
        right_id: NodeId,
        sep_key: i64,
    ) {
        match old_parent {
            None => {
                let new_root_id = self.alloc_internal(vec![sep_key], vec![left_id, right_id]);
                self.arena.get_mut(left_id).set_parent(Some(new_root_id), NO_PARENT_KEY_IDX);
                self.arena.get_mut(right_id).set_parent(Some(new_root_id), 0);
                self.root = Some(new_root_id);
                self.level += 1;
                log::debug!("promoted new root at level {}", self.level);
            }
            Some(parent_id) => {
                let child_pos = (old_parent_key_idx + 1) as usize;
                {
                    let parent = self.arena.internal_mut(parent_id);
                    parent.children[child_pos] = left_id;
                    parent.children.insert(child_pos + 1, right_id);
                    parent.keys.insert(child_pos, sep_key);
                }
                self.renumber_children(parent_id);
                if self.arena.internal(parent_id).children.len() > self.order {
                    self.split_internal_node(parent_id);
                }
            }
        }
    }

    fn split_internal_node(&mut self, node_id: NodeId) {
        let s = self.order / 2;
        let old_parent = self.arena.internal(node_id).parent;
        let old_parent_key_idx = self.arena.internal(node_id).parent_key_idx;

        let (promoted, right_keys, right_children) = {
            let node = self.arena.internal_mut(node_id);
            let right_keys = node.keys.split_off(s + 1);
            let promoted = node.keys.pop().expect("overfull internal node has a middle key");
            let right_children = node.children.split_off(s + 1);
            (promoted, right_keys, right_children)
        };

        let new_id = self.alloc_internal(right_keys, right_children);
        self.link_internal_after(new_id, node_id);
        self.renumber_children(node_id);
        self.renumber_children(new_id);
        log::trace!("internal split promotes key {promoted}");
        self.propagate_split(old_parent, old_parent_key_idx, node_id, new_id, promoted);
    }

    // =========================
    // Rebalance path (delete)
    // =========================

    fn rebalance_leaf(&mut self, leaf_id: NodeId) {
        let parent = self.arena.leaf(leaf_id).parent;
        match parent {
            None => {
                if self.arena.leaf(leaf_id).entries.is_empty() {
                    self.arena.free(leaf_id);
                    self.root = None;
                    self.first_leaf = None;
                    self.level = 0;
                    log::debug!("tree emptied");
                }
            }
            Some(parent_id) => {
                if self.arena.leaf(leaf_id).entries.len() >= self.min_entries() {
                    return;
                }
                self.rebalance_leaf_underflow(leaf_id, parent_id);
            }
        }
    }

    fn rebalance_leaf_underflow(&mut self, leaf_id: NodeId, parent_id: NodeId) {
        let parent_key_idx = self.arena.leaf(leaf_id).parent_key_idx;
        let parent_children = self.arena.internal(parent_id).children.len();
        let prev_id = self.arena.leaf(leaf_id).prev;
        let next_id = self.arena.leaf(leaf_id).next;
        let min_entries = self.min_entries();

        let use_right = if parent_key_idx == NO_PARENT_KEY_IDX {
            true
        } else if parent_key_idx as usize == parent_children - 2 {
            false
        } else {
            self.arena.leaf(next_id).entries.len() > self.arena.leaf(prev_id).entries.len()
        };

        if use_right {
            if self.arena.leaf(next_id).entries.len() > min_entries {
                self.leaf_shift_from_right(leaf_id, next_id, parent_id);
            } else {
                self.leaf_merge_from_right(leaf_id, next_id, parent_id);
            }
        } else if self.arena.leaf(prev_id).entries.len() > min_entries {
            self.leaf_shift_from_left(leaf_id, prev_id, parent_id);
        } else {
            self.leaf_merge_into_left(leaf_id, prev_id, parent_id);
        }
    }

    fn leaf_shift_from_right(&mut self, leaf_id: NodeId, sibling_id: NodeId, parent_id: NodeId) {
        let moved = self.arena.leaf_mut(sibling_id).entries.remove(0);
        self.arena.leaf_mut(leaf_id).entries.push(moved);
        let new_sep = self.arena.leaf(sibling_id).entries[0].0;
        let sep_idx = self.arena.leaf(sibling_id).parent_key_idx as usize;
        self.arena.internal_mut(parent_id).keys[sep_idx] = new_sep;
    }

    fn leaf_shift_from_left(&mut self, leaf_id: NodeId, sibling_id: NodeId, parent_id: NodeId) {
        let moved = self.arena.leaf_mut(sibling_id).entries.pop().expect("sibling has a spare entry");
        self.arena.leaf_mut(leaf_id).entries.insert(0, moved);
        let new_sep = self.arena.leaf(leaf_id).entries[0].0;
        let sep_idx = self.arena.leaf(leaf_id).parent_key_idx as usize;
        self.arena.internal_mut(parent_id).keys[sep_idx] = new_sep;
    }

    fn leaf_merge_into_left(&mut self, leaf_id: NodeId, sibling_id: NodeId, parent_id: NodeId) {
        let mut entries = std::mem::take(&mut self.arena.leaf_mut(leaf_id).entries);
        self.arena.leaf_mut(sibling_id).entries.append(&mut entries);
        let leaf_pos = (self.arena.leaf(leaf_id).parent_key_idx + 1) as usize;
        self.remove_child_from_internal(parent_id, leaf_pos);
        self.unlink_leaf(leaf_id);
        self.arena.free(leaf_id);
        self.rebalance_internal(parent_id);
    }

    fn leaf_merge_from_right(&mut self, leaf_id: NodeId, sibling_id: NodeId, parent_id: NodeId) {
        let mut entries = std::mem::take(&mut self.arena.leaf_mut(sibling_id).entries);
        self.arena.leaf_mut(leaf_id).entries.append(&mut entries);
        let sibling_pos = (self.arena.leaf(sibling_id).parent_key_idx + 1) as usize;
        self.remove_child_from_internal(parent_id, sibling_pos);
        self.unlink_leaf(sibling_id);
        self.arena.free(sibling_id);
        self.rebalance_internal(parent_id);
    }

    /// Removes `children[child_pos]` and the separator immediately to its
    /// left (or, for the leftmost child, to its right), then renumbers.
    fn remove_child_from_internal(&mut self, parent_id: NodeId, child_pos: usize) {
        let node = self.arena.internal_mut(parent_id);
        node.children.remove(child_pos);
        if child_pos == 0 {
            node.keys.remove(0);
        } else {
            node.keys.remove(child_pos - 1);
        }
        self.renumber_children(parent_id);
    }

    fn rebalance_internal(&mut self, node_id: NodeId) {
        let parent = self.arena.internal(node_id).parent;
        match parent {
            None => {
                if self.arena.internal(node_id).children.len() == 1 {
                    let sole_child = self.arena.internal(node_id).children[0];
                    self.arena.get_mut(sole_child).set_parent(None, NO_PARENT_KEY_IDX);
                    self.root = Some(sole_child);
                    self.level -= 1;
                    self.arena.free(node_id);
                    log::debug!("demoted root, new level {}", self.level);
                }
            }
            Some(parent_id) => {
                if self.arena.internal(node_id).children.len() >= self.min_children() {
                    return;
                }
                self.rebalance_internal_underflow(node_id, parent_id);
            }
        }
    }

    fn rebalance_internal_underflow(&mut self, node_id: NodeId, parent_id: NodeId) {
        let parent_key_idx = self.arena.internal(node_id).parent_key_idx;
        let parent_children = self.arena.internal(parent_id).children.len();
        let prev_id = self.arena.internal(node_id).prev;
        let next_id = self.arena.internal(node_id).next;
        let min_children = self.min_children();

        let use_right = if parent_key_idx == NO_PARENT_KEY_IDX {
            true
        } else if parent_key_idx as usize == parent_children - 2 {
            false
        } else {
            self.arena.internal(next_id).children.len() > self.arena.internal(prev_id).children.len()
        };

        if use_right {
            if self.arena.internal(next_id).children.len() > min_children {
                self.internal_shift_from_right(node_id, next_id, parent_id);
            } else {
                self.internal_merge_from_right(node_id, next_id, parent_id);
            }
        } else if self.arena.internal(prev_id).children.len() > min_children {
            self.internal_shift_from_left(node_id, prev_id, parent_id);
        } else {
            self.internal_merge_into_left(node_id, prev_id, parent_id);
        }
    }

    fn internal_shift_from_right(&mut self, node_id: NodeId, sibling_id: NodeId, parent_id: NodeId) {
        let sep_idx = self.arena.internal(sibling_id).parent_key_idx as usize;
        let down = self.arena.internal(parent_id).keys[sep_idx];
        let moved_child = self.arena.internal_mut(sibling_id).children.remove(0);
        let up = self.arena.internal_mut(sibling_id).keys.remove(0);
        self.arena.internal_mut(node_id).keys.push(down);
        self.arena.internal_mut(node_id).children.push(moved_child);
        self.arena.internal_mut(parent_id).keys[sep_idx] = up;
        self.renumber_children(node_id);
        self.renumber_children(sibling_id);
    }

    fn internal_shift_from_left(&mut self, node_id: NodeId, sibling_id: NodeId, parent_id: NodeId) {
        let sep_idx = self.arena.internal(node_id).parent_key_idx as usize;
        let down = self.arena.internal(parent_id).keys[sep_idx];
        let moved_child = self.arena.internal_mut(sibling_id).children.pop().expect("sibling has a spare child");
        let up = self.arena.internal_mut(sibling_id).keys.pop().expect("sibling has a spare key");
        self.arena.internal_mut(node_id).keys.insert(0, down);
        self.arena.internal_mut(node_id).children.insert(0, moved_child);
        self.arena.internal_mut(parent_id).keys[sep_idx] = up;
        self.renumber_children(node_id);
        self.renumber_children(sibling_id);
    }

    fn internal_merge_into_left(&mut self, node_id: NodeId, sibling_id: NodeId, parent_id: NodeId) {
        let sep_idx = self.arena.internal(node_id).parent_key_idx as usize;
        let sep_key = self.arena.internal(parent_id).keys[sep_idx];
        let mut keys = std::mem::take(&mut self.arena.internal_mut(node_id).keys);
        let mut children = std::mem::take(&mut self.arena.internal_mut(node_id).children);
        self.arena.internal_mut(sibling_id).keys.push(sep_key);
        self.arena.internal_mut(sibling_id).keys.append(&mut keys);
        self.arena.internal_mut(sibling_id).children.append(&mut children);
        self.renumber_children(sibling_id);

        let node_pos = (self.arena.internal(node_id).parent_key_idx + 1) as usize;
        self.remove_child_from_internal(parent_id, node_pos);
        self.unlink_internal(node_id);
        self.arena.free(node_id);
        self.rebalance_internal(parent_id);
    }

    fn internal_merge_from_right(&mut self, node_id: NodeId, sibling_id: NodeId, parent_id: NodeId) {
        let sep_idx = self.arena.internal(sibling_id).parent_key_idx as usize;
        let sep_key = self.arena.internal(parent_id).keys[sep_idx];
        let mut keys = std::mem::take(&mut self.arena.internal_mut(sibling_id).keys);
        let mut children = std::mem::take(&mut self.arena.internal_mut(sibling_id).children);
        self.arena.internal_mut(node_id).keys.push(sep_key);
        self.arena.internal_mut(node_id).keys.append(&mut keys);
        self.arena.internal_mut(node_id).children.append(&mut children);
        self.renumber_children(node_id);

        let sibling_pos = (self.arena.internal(sibling_id).parent_key_idx + 1) as usize;
        self.remove_child_from_internal(parent_id, sibling_pos);
        self.unlink_internal(sibling_id);
        self.arena.free(sibling_id);
        self.rebalance_internal(parent_id);
    }

    // =========================
    // Inspection
    // =========================

    pub(crate) fn arena(&self) -> &Arena {
        &self.arena
    }

    pub(crate) fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    /// Validates every structural invariant against the whole tree.
    /// Exists for tests; never called on the hot insert/delete path.
    pub fn check_invariants(&self) -> Result<(), String> {
        let Some(root_id) = self.root else {
            if self.level != 0 {
                return Err("empty tree must have level 0".to_string());
            }
            return Ok(());
        };
        let mut leaf_depths = Vec::new();
        self.check_node(root_id, None, NO_PARENT_KEY_IDX, 0, true, &mut leaf_depths)?;
        if let Some(&first) = leaf_depths.first() {
            if leaf_depths.iter().any(|&d| d != first) {
                return Err("leaves at non-uniform depth".to_string());
            }
        }
        self.check_leaf_list()
    }

    fn check_node(
        &self,
        id: NodeId,
        expected_parent: Option<NodeId>,
        expected_pki: isize,
        depth: usize,
        is_root: bool,
        leaf_depths: &mut Vec<usize>,
    ) -> Result<(i64, i64), String> {
        let node = self.arena.get(id);
        if node.parent() != expected_parent {
            return Err(format!("{id:?} parent mismatch"));
        }
        if node.parent_key_idx() != expected_pki {
            return Err(format!("{id:?} parent_key_idx mismatch"));
        }
        match node {
            Node::Leaf(l) => {
                if l.entries.is_empty() {
                    return Err(format!("{id:?} leaf is empty"));
                }
                if !is_root && l.entries.len() < self.min_entries() {
                    return Err(format!("{id:?} leaf underflowed"));
                }
                for w in l.entries.windows(2) {
                    if w[0].0 >= w[1].0 {
                        return Err(format!("{id:?} leaf keys not strictly increasing"));
                    }
                }
                leaf_depths.push(depth);
                Ok((l.entries[0].0, l.entries[l.entries.len() - 1].0))
            }
            Node::Internal(n) => {
                if n.children.len() < 2 {
                    return Err(format!("{id:?} internal has fewer than 2 children"));
                }
                if !is_root && n.children.len() < self.min_children() {
                    return Err(format!("{id:?} internal underflowed"));
                }
                if n.keys.len() + 1 != n.children.len() {
                    return Err(format!("{id:?} keys/children count mismatch"));
                }
                for w in n.keys.windows(2) {
                    if w[0] >= w[1] {
                        return Err(format!("{id:?} internal keys not strictly increasing"));
                    }
                }
                let mut subtree_min = None;
                let mut subtree_max = None;
                for (i, &cid) in n.children.iter().enumerate() {
                    let (cmin, cmax) =
                        self.check_node(cid, Some(id), i as isize - 1, depth + 1, false, leaf_depths)?;
                    if i > 0 && cmin < n.keys[i - 1] {
                        return Err(format!("{id:?} child {i} violates left separator"));
                    }
                    if i + 1 < n.children.len() && cmax >= n.keys[i] {
                        return Err(format!("{id:?} child {i} violates right separator"));
                    }
                    subtree_min.get_or_insert(cmin);
                    subtree_max = Some(cmax);
                }
                Ok((subtree_min.unwrap(), subtree_max.unwrap()))
            }
        }
    }

    fn check_leaf_list(&self) -> Result<(), String> {
        let Some(first) = self.first_leaf else {
            return Ok(());
        };
        let mut prev_key: Option<i64> = None;
        let mut id = first;
        loop {
            let leaf = self.arena.leaf(id);
            for &(k, _) in &leaf.entries {
                if let Some(p) = prev_key {
                    if k <= p {
                        return Err("leaf list not in ascending order".to_string());
                    }
                }
                prev_key = Some(k);
            }
            id = leaf.next;
            if id == first {
                break;
            }
        }
        Ok(())
    }
}
