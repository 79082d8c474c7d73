//! The course catalog.
//!
//! The [`CourseCatalog`] pairs an ordered tree that owns every course record
//! with a hash index over the same IDs. Both structures are only ever changed
//! together, inside a single catalog method.

use std::num::NonZeroUsize;

use tracing::instrument;

use crate::domain::{Course, CourseId, Error};

mod index;
pub use index::HashIndex;

mod tree;
pub use tree::{CourseTree, InOrder, Slot};

/// Ordered course store with a hash index for point lookups.
#[derive(Debug)]
pub struct CourseCatalog {
    /// Owns the records, ordered by ID.
    tree: CourseTree,

    /// Course ID to tree slot. Never owns a record.
    index: HashIndex,
}

impl CourseCatalog {
    /// Creates an empty catalog whose index has `buckets` chains.
    #[must_use]
    pub fn new(buckets: NonZeroUsize) -> Self {
        Self {
            tree: CourseTree::default(),
            index: HashIndex::with_buckets(buckets),
        }
    }

    /// Adds a course to the tree and the index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateCourse`] if either structure already knows the
    /// ID. Neither structure is modified in that case.
    #[instrument(skip(self, course), fields(id = %course.id()))]
    pub fn insert(&mut self, course: Course) -> Result<(), Error> {
        let id = course.id();
        if self.index.get(id).is_some() || self.tree.find(id).is_some() {
            return Err(Error::DuplicateCourse(id));
        }

        let slot = self
            .tree
            .insert(course)
            .map_err(|course| Error::DuplicateCourse(course.id()))?;
        self.index.insert(id, slot);

        tracing::debug!("course added");
        Ok(())
    }

    /// Looks a course up through the index, falling back to a tree search if
    /// the index has no usable entry.
    #[must_use]
    pub fn lookup(&self, id: CourseId) -> Option<&Course> {
        self.resolve(id).and_then(|slot| self.tree.get(slot))
    }

    pub(crate) fn lookup_mut(&mut self, id: CourseId) -> Option<&mut Course> {
        let slot = self.resolve(id)?;
        self.tree.get_mut(slot)
    }

    /// Looks a course up through the index only.
    ///
    /// Returns `None` when the index has no entry for `id`, or when the entry
    /// no longer points at that course, even if the tree holds it.
    #[must_use]
    pub fn lookup_indexed(&self, id: CourseId) -> Option<&Course> {
        let slot = self.index.get(id)?;
        self.tree.get(slot).filter(|course| course.id() == id)
    }

    /// Returns `true` if the catalog holds this course.
    #[must_use]
    pub fn contains(&self, id: CourseId) -> bool {
        self.resolve(id).is_some()
    }

    /// Removes a course from the tree and the index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCourse`] if the tree holds no such course. Any
    /// stray index entry for the ID is dropped regardless.
    #[instrument(skip(self))]
    pub fn remove(&mut self, id: CourseId) -> Result<Course, Error> {
        let Some(removal) = self.tree.remove(id) else {
            self.index.remove(id);
            return Err(Error::UnknownCourse(id));
        };

        self.index.remove(id);
        if let Some((moved, slot)) = removal.relocated {
            if !self.index.repoint(moved, slot) {
                self.index.insert(moved, slot);
            }
        }

        tracing::debug!("course removed");
        Ok(removal.course)
    }

    /// Clears the index and re-adds an entry for every course in the tree.
    ///
    /// Returns the number of courses indexed.
    #[instrument(skip(self))]
    pub fn rebuild_index(&mut self) -> usize {
        self.index.clear();
        let mut count = 0;
        for (slot, course) in self.tree.in_order() {
            self.index.insert(course.id(), slot);
            count += 1;
        }
        tracing::info!(count, "course index rebuilt");
        count
    }

    /// Drops every index entry. Lookups fall back to the tree until
    /// [`CourseCatalog::rebuild_index`] is called.
    pub fn reset_index(&mut self) {
        self.index.clear();
        tracing::info!("course index cleared");
    }

    /// Iterates courses in ascending ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Course> + '_ {
        self.tree.in_order().map(|(_, course)| course)
    }

    /// Number of courses.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the catalog holds no courses.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Read access to the index.
    #[must_use]
    pub const fn index(&self) -> &HashIndex {
        &self.index
    }

    /// Height of the course tree.
    #[must_use]
    pub fn tree_height(&self) -> usize {
        self.tree.height()
    }

    /// Courses held by the tree that the index cannot resolve, in ascending
    /// order.
    #[must_use]
    pub fn unindexed(&self) -> Vec<CourseId> {
        self.iter()
            .map(Course::id)
            .filter(|&id| self.lookup_indexed(id).is_none())
            .collect()
    }

    /// Index entries that point at an empty slot or at a different course.
    #[must_use]
    pub fn stale_index_entries(&self) -> Vec<CourseId> {
        self.index
            .entries()
            .filter(|&(id, slot)| self.tree.get(slot).is_none_or(|course| course.id() != id))
            .map(|(id, _)| id)
            .collect()
    }

    fn resolve(&self, id: CourseId) -> Option<Slot> {
        if let Some(slot) = self.index.get(id) {
            if self.tree.get(slot).is_some_and(|course| course.id() == id) {
                return Some(slot);
            }
        }

        let slot = self.tree.find(id)?;
        tracing::warn!(course = %id, "course missing from index, found by tree search");
        Some(slot)
    }
}

impl Default for CourseCatalog {
    fn default() -> Self {
        Self::new(crate::domain::Config::default().index_buckets())
    }
}
