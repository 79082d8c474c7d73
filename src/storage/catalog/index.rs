//! Chained hash index from course ID to tree slot.
//!
//! The index owns no course data. Each entry is a course ID paired with the
//! [`Slot`] of the tree node that holds the record, so an entry goes stale as
//! soon as the tree moves or frees that node. Keeping entries current is the
//! catalog's job.

use std::{collections::VecDeque, num::NonZeroUsize};

use crate::{domain::CourseId, storage::catalog::tree::Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    course: CourseId,
    slot: Slot,
}

/// A fixed number of buckets, each a chain of entries. New entries go to the
/// head of their chain.
#[derive(Debug)]
pub struct HashIndex {
    buckets: Vec<VecDeque<Entry>>,
}

impl HashIndex {
    /// Creates an empty index with the given number of buckets.
    #[must_use]
    pub fn with_buckets(buckets: NonZeroUsize) -> Self {
        Self {
            buckets: vec![VecDeque::new(); buckets.get()],
        }
    }

    /// Number of buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// The bucket a course ID hashes to: `id mod bucket_count`.
    #[must_use]
    pub fn bucket_of(&self, course: CourseId) -> usize {
        course.get() as usize % self.buckets.len()
    }

    /// Adds an entry at the head of the course's chain.
    pub fn insert(&mut self, course: CourseId, slot: Slot) {
        let bucket = self.bucket_of(course);
        if let Some(chain) = self.buckets.get_mut(bucket) {
            chain.push_front(Entry { course, slot });
        }
    }

    /// The slot recorded for `course`, scanning its chain from the head.
    #[must_use]
    pub fn get(&self, course: CourseId) -> Option<Slot> {
        self.chain(course)?
            .iter()
            .find(|entry| entry.course == course)
            .map(|entry| entry.slot)
    }

    /// Points an existing entry at a new slot. Returns `false` if `course`
    /// has no entry.
    pub fn repoint(&mut self, course: CourseId, slot: Slot) -> bool {
        let bucket = self.bucket_of(course);
        let entry = self
            .buckets
            .get_mut(bucket)
            .and_then(|chain| chain.iter_mut().find(|entry| entry.course == course));
        match entry {
            Some(entry) => {
                entry.slot = slot;
                true
            }
            None => false,
        }
    }

    /// Unlinks the first entry for `course`. Returns `false` if there was none.
    pub fn remove(&mut self, course: CourseId) -> bool {
        let bucket = self.bucket_of(course);
        let Some(chain) = self.buckets.get_mut(bucket) else {
            return false;
        };
        match chain.iter().position(|entry| entry.course == course) {
            Some(position) => chain.remove(position).is_some(),
            None => false,
        }
    }

    /// Drops every entry, keeping the bucket count.
    pub fn clear(&mut self) {
        for chain in &mut self.buckets {
            chain.clear();
        }
    }

    /// Total number of entries across all chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().map(VecDeque::len).sum()
    }

    /// Returns `true` if no entries are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(VecDeque::is_empty)
    }

    /// Every indexed course ID with its slot, bucket by bucket and head first.
    pub fn entries(&self) -> impl Iterator<Item = (CourseId, Slot)> + '_ {
        self.buckets
            .iter()
            .flatten()
            .map(|entry| (entry.course, entry.slot))
    }

    /// Chain lengths, one per bucket.
    pub fn chain_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.buckets.iter().map(VecDeque::len)
    }

    fn chain(&self, course: CourseId) -> Option<&VecDeque<Entry>> {
        self.buckets.get(self.bucket_of(course))
    }
}
