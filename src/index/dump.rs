// =====================================================================
// File: index/dump.rs
//
// Description:
//   Non-recursive structural dump of a tree, for inspection and as a
//   test oracle. Walks the tree with an explicit per-depth stack
//   instead of recursion: each frame remembers which child to descend
//   into next, and a node is printed the first time it is visited
//   (when that frame's next-child counter is still zero).
// =====================================================================
use std::fmt::{self, Write};

use super::node::Node;
use super::tree::Tree;

struct Frame {
    id: super::node::NodeId,
    next_child: usize,
}

/// Writes a human-readable, indented tree to `out`. The exact format is
/// not a compatibility contract; it exists for debugging and tests.
pub fn dump<W: Write>(tree: &Tree, out: &mut W) -> fmt::Result {
    let Some(root_id) = tree.root_id() else {
        return writeln!(out, "(empty)");
    };

    let mut stack = vec![Frame {
        id: root_id,
        next_child: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        let id = frame.id;
        let depth = stack.len() - 1;

        if frame.next_child == 0 {
            match tree.arena().get(id) {
                Node::Leaf(l) => {
                    writeln!(out, "{}leaf{:?} {:?}", "  ".repeat(depth), id, l.entries)?;
                }
                Node::Internal(n) => {
                    writeln!(out, "{}internal{:?} keys={:?}", "  ".repeat(depth), id, n.keys)?;
                }
            }
        }

        let descend = match tree.arena().get(id) {
            Node::Leaf(_) => None,
            Node::Internal(n) => {
                if frame.next_child < n.children.len() {
                    let child_id = n.children[frame.next_child];
                    frame.next_child += 1;
                    Some(child_id)
                } else {
                    None
                }
            }
        };

        match descend {
            Some(child_id) => stack.push(Frame {
                id: child_id,
                next_child: 0,
            }),
            None => {
                stack.pop();
            }
        }
    }

    Ok(())
}
