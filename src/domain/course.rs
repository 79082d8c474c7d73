use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::error::CapacityExceeded;

/// Numeric identifier of a course.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CourseId(u32);

impl CourseId {
    /// Wraps a raw course number.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw course number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for CourseId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for CourseId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// The prerequisite list of a course.
///
/// Holds at most [`Prerequisites::CAPACITY`] IDs in the order they were
/// added. Duplicates are kept and IDs are not checked against the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Prerequisites(Vec<CourseId>);

impl Prerequisites {
    /// Maximum number of prerequisites a single course may list.
    pub const CAPACITY: usize = 10;

    /// Appends a prerequisite, handing it back if the list is full.
    fn push(&mut self, id: CourseId) -> Result<(), CourseId> {
        if self.0.len() >= Self::CAPACITY {
            return Err(id);
        }
        self.0.push(id);
        Ok(())
    }

    /// Iterates the prerequisite IDs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = CourseId> + '_ {
        self.0.iter().copied()
    }

    /// Number of listed prerequisites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the course has no prerequisites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if `id` is listed.
    #[must_use]
    pub fn contains(&self, id: CourseId) -> bool {
        self.0.contains(&id)
    }

    /// The listed IDs as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[CourseId] {
        &self.0
    }
}

/// Display-only categorisation of a course by its credit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CreditTier {
    /// Zero credits.
    Uncredited,
    /// One credit.
    One,
    /// Two credits.
    Two,
    /// Three or more credits.
    ThreeOrMore,
}

impl fmt::Display for CreditTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uncredited => "Uncredited",
            Self::One => "1 Credit",
            Self::Two => "2 Credits",
            Self::ThreeOrMore => "3+ Credits",
        })
    }
}

/// A course record.
///
/// The enrolled count is maintained by the enrollment ledger and cannot be
/// set directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
    id: CourseId,
    /// Course title.
    pub name: String,
    /// Credit count. Only used for display.
    pub credits: u8,
    /// Instructor name.
    pub instructor: String,
    max_capacity: u32,
    enrolled: u32,
    prerequisites: Prerequisites,
}

impl Course {
    /// Creates a course with no credits, no instructor, unlimited capacity and
    /// no prerequisites.
    pub fn new(id: impl Into<CourseId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            credits: 0,
            instructor: String::new(),
            max_capacity: 0,
            enrolled: 0,
            prerequisites: Prerequisites::default(),
        }
    }

    /// Sets the credit count.
    #[must_use]
    pub fn with_credits(mut self, credits: u8) -> Self {
        self.credits = credits;
        self
    }

    /// Sets the instructor.
    #[must_use]
    pub fn with_instructor(mut self, instructor: impl Into<String>) -> Self {
        self.instructor = instructor.into();
        self
    }

    /// Sets the maximum capacity. Zero means unlimited.
    #[must_use]
    pub fn with_max_capacity(mut self, max_capacity: u32) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Adds every ID in `ids` as a prerequisite.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityExceeded::Prerequisites`] if the list would grow past
    /// [`Prerequisites::CAPACITY`]. The course is consumed either way.
    pub fn with_prerequisites(
        mut self,
        ids: impl IntoIterator<Item = CourseId>,
    ) -> Result<Self, CapacityExceeded> {
        for id in ids {
            self.add_prerequisite(id)?;
        }
        Ok(self)
    }

    /// Adds a single prerequisite.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityExceeded::Prerequisites`] if the list is full, in
    /// which case the course is unchanged.
    pub fn add_prerequisite(&mut self, id: CourseId) -> Result<(), CapacityExceeded> {
        self.prerequisites
            .push(id)
            .map_err(|_| CapacityExceeded::Prerequisites {
                course: self.id,
                capacity: Prerequisites::CAPACITY,
            })
    }

    /// The course's ID.
    #[must_use]
    pub const fn id(&self) -> CourseId {
        self.id
    }

    /// Maximum capacity, zero meaning unlimited.
    #[must_use]
    pub const fn max_capacity(&self) -> u32 {
        self.max_capacity
    }

    /// Number of students currently enrolled.
    #[must_use]
    pub const fn enrolled(&self) -> u32 {
        self.enrolled
    }

    /// The course's direct prerequisites.
    #[must_use]
    pub const fn prerequisites(&self) -> &Prerequisites {
        &self.prerequisites
    }

    /// Returns `true` if the course has a capacity and has reached it.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.max_capacity > 0 && self.enrolled >= self.max_capacity
    }

    /// Describes the overflow if the course is full.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityExceeded::Course`] when [`Course::is_full`] holds.
    pub const fn check_capacity(&self) -> Result<(), CapacityExceeded> {
        if self.is_full() {
            Err(CapacityExceeded::Course {
                course: self.id,
                enrolled: self.enrolled,
                max: self.max_capacity,
            })
        } else {
            Ok(())
        }
    }

    /// Display category derived from the credit count.
    #[must_use]
    pub const fn credit_tier(&self) -> CreditTier {
        match self.credits {
            0 => CreditTier::Uncredited,
            1 => CreditTier::One,
            2 => CreditTier::Two,
            _ => CreditTier::ThreeOrMore,
        }
    }

    pub(crate) fn increment_enrolled(&mut self) {
        self.enrolled = self.enrolled.saturating_add(1);
    }

    /// Floors at zero.
    pub(crate) fn decrement_enrolled(&mut self) {
        self.enrolled = self.enrolled.saturating_sub(1);
    }
}
