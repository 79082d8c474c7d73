//! Unbalanced binary search tree of courses keyed by ID.
//!
//! Nodes live in an arena and link to each other by [`Slot`]. A slot stays
//! valid until its node is removed; removed slots are recycled by later
//! inserts.

use std::cmp::Ordering;

use crate::domain::{Course, CourseId};

/// Position of a node in the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

#[derive(Debug)]
struct Node {
    course: Course,
    left: Option<Slot>,
    right: Option<Slot>,
}

/// Result of removing a course from the tree.
#[derive(Debug)]
pub struct Removal {
    /// The removed course.
    pub course: Course,
    /// Set when the in-order successor's record was moved into the removed
    /// node's slot. Holds the successor's ID and its new slot.
    pub relocated: Option<(CourseId, Slot)>,
}

/// The owning store of course records.
#[derive(Debug, Default)]
pub struct CourseTree {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    root: Option<Slot>,
    len: usize,
}

impl CourseTree {
    /// Inserts a course at its ordered position.
    ///
    /// # Errors
    ///
    /// Hands the course back if its ID is already present.
    pub fn insert(&mut self, course: Course) -> Result<Slot, Course> {
        let key = course.id();
        let mut parent = None;
        let mut cursor = self.root;

        while let Some(current) = cursor {
            let Some(node) = self.node(current) else {
                break;
            };
            cursor = match key.cmp(&node.course.id()) {
                Ordering::Less => {
                    parent = Some((current, Side::Left));
                    node.left
                }
                Ordering::Greater => {
                    parent = Some((current, Side::Right));
                    node.right
                }
                Ordering::Equal => return Err(course),
            };
        }

        let slot = self.alloc(Node {
            course,
            left: None,
            right: None,
        });
        self.set_link(parent, Some(slot));
        self.len += 1;
        Ok(slot)
    }

    /// Finds the slot holding the course with this ID.
    #[must_use]
    pub fn find(&self, id: CourseId) -> Option<Slot> {
        self.locate(id).map(|(slot, _)| slot)
    }

    /// The course stored at `slot`, if the slot is occupied.
    #[must_use]
    pub fn get(&self, slot: Slot) -> Option<&Course> {
        self.node(slot).map(|node| &node.course)
    }

    /// Mutable access to the course stored at `slot`.
    pub fn get_mut(&mut self, slot: Slot) -> Option<&mut Course> {
        self.node_mut(slot).map(|node| &mut node.course)
    }

    /// Removes the course with this ID.
    ///
    /// A node with two children is not unlinked itself: the in-order
    /// successor's record is moved into it and the successor's node is
    /// unlinked instead. [`Removal::relocated`] reports that move.
    pub fn remove(&mut self, id: CourseId) -> Option<Removal> {
        let (target, parent) = self.locate(id)?;
        let (left, right) = {
            let node = self.node(target)?;
            (node.left, node.right)
        };

        let removal = match (left, right) {
            (Some(_), Some(right)) => {
                let mut successor_parent = target;
                let mut successor = right;
                while let Some(next) = self.node(successor)?.left {
                    successor_parent = successor;
                    successor = next;
                }

                let successor_right = self.node(successor)?.right;
                if successor_parent == target {
                    self.node_mut(target)?.right = successor_right;
                } else {
                    self.node_mut(successor_parent)?.left = successor_right;
                }

                let successor = self.release(successor)?;
                let moved = successor.course.id();
                let node = self.node_mut(target)?;
                let course = std::mem::replace(&mut node.course, successor.course);
                Removal {
                    course,
                    relocated: Some((moved, target)),
                }
            }
            (child, None) | (None, child) => {
                self.set_link(parent, child);
                let node = self.release(target)?;
                Removal {
                    course: node.course,
                    relocated: None,
                }
            }
        };

        self.len -= 1;
        Some(removal)
    }

    /// Walks the tree in ascending ID order.
    #[must_use]
    pub fn in_order(&self) -> InOrder<'_> {
        InOrder {
            tree: self,
            stack: Vec::new(),
            cursor: self.root,
        }
    }

    /// Number of courses in the tree.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree holds no courses.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Length of the longest root-to-leaf path.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut pending: Vec<(Slot, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();
        while let Some((slot, depth)) = pending.pop() {
            height = height.max(depth);
            if let Some(node) = self.node(slot) {
                pending.extend(node.left.map(|left| (left, depth + 1)));
                pending.extend(node.right.map(|right| (right, depth + 1)));
            }
        }
        height
    }
}

impl CourseTree {
    fn node(&self, slot: Slot) -> Option<&Node> {
        self.nodes.get(slot.0)?.as_ref()
    }

    fn node_mut(&mut self, slot: Slot) -> Option<&mut Node> {
        self.nodes.get_mut(slot.0)?.as_mut()
    }

    /// The node holding `id`, with its parent and the side it hangs from.
    fn locate(&self, id: CourseId) -> Option<(Slot, Option<(Slot, Side)>)> {
        let mut parent = None;
        let mut cursor = self.root;
        while let Some(current) = cursor {
            let node = self.node(current)?;
            cursor = match id.cmp(&node.course.id()) {
                Ordering::Less => {
                    parent = Some((current, Side::Left));
                    node.left
                }
                Ordering::Greater => {
                    parent = Some((current, Side::Right));
                    node.right
                }
                Ordering::Equal => return Some((current, parent)),
            };
        }
        None
    }

    fn set_link(&mut self, parent: Option<(Slot, Side)>, child: Option<Slot>) {
        match parent {
            None => self.root = child,
            Some((slot, side)) => {
                if let Some(node) = self.node_mut(slot) {
                    match side {
                        Side::Left => node.left = child,
                        Side::Right => node.right = child,
                    }
                }
            }
        }
    }

    fn alloc(&mut self, node: Node) -> Slot {
        if let Some(index) = self.free.pop() {
            if let Some(cell) = self.nodes.get_mut(index) {
                *cell = Some(node);
                return Slot(index);
            }
        }
        self.nodes.push(Some(node));
        Slot(self.nodes.len() - 1)
    }

    fn release(&mut self, slot: Slot) -> Option<Node> {
        let node = self.nodes.get_mut(slot.0)?.take()?;
        self.free.push(slot.0);
        Some(node)
    }
}

/// In-order iterator over a [`CourseTree`], yielding each course with its
/// slot.
#[derive(Debug)]
pub struct InOrder<'a> {
    tree: &'a CourseTree,
    stack: Vec<Slot>,
    cursor: Option<Slot>,
}

impl<'a> Iterator for InOrder<'a> {
    type Item = (Slot, &'a Course);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(slot) = self.cursor {
            self.stack.push(slot);
            self.cursor = self.tree.node(slot).and_then(|node| node.left);
        }
        let slot = self.stack.pop()?;
        let node = self.tree.node(slot)?;
        self.cursor = node.right;
        Some((slot, &node.course))
    }
}
