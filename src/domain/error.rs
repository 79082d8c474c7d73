use serde::Serialize;
use thiserror::Error;

use crate::domain::{CourseId, StudentId};

/// Errors reported by the records store.
///
/// Every operation that can fail returns one of these and leaves all
/// structures exactly as they were before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A student with this ID is already registered.
    #[error("student {0} already exists")]
    DuplicateStudent(StudentId),

    /// A course with this ID is already in the catalog.
    #[error("course {0} already exists")]
    DuplicateCourse(CourseId),

    /// No student with this ID is registered.
    #[error("student {0} not found")]
    UnknownStudent(StudentId),

    /// No course with this ID is in the catalog.
    #[error("course {0} not found")]
    UnknownCourse(CourseId),

    /// The ledger holds no entry for this pair.
    #[error("student {student} is not enrolled in course {course}")]
    NotEnrolled {
        /// The student.
        student: StudentId,
        /// The course.
        course: CourseId,
    },

    /// A bounded structure is full.
    #[error(transparent)]
    CapacityExceeded(#[from] CapacityExceeded),

    /// The student lacks an active enrollment in a (transitive) prerequisite.
    #[error("student {student} cannot take course {course}: missing prerequisite {missing}")]
    IneligiblePrerequisite {
        /// The student.
        student: StudentId,
        /// The course being requested.
        course: CourseId,
        /// The first prerequisite found without an enrollment record.
        missing: CourseId,
    },

    /// The ledger already holds this pair.
    #[error("student {student} is already enrolled in course {course}")]
    AlreadyEnrolled {
        /// The student.
        student: StudentId,
        /// The course.
        course: CourseId,
    },

    /// The waitlist already holds this pair.
    #[error("student {student} is already waitlisted for course {course}")]
    AlreadyWaitlisted {
        /// The student.
        student: StudentId,
        /// The course.
        course: CourseId,
    },

    /// The waitlist has no entries.
    #[error("waitlist is empty")]
    WaitlistEmpty,
}

/// The bounded structure that overflowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CapacityExceeded {
    /// The course has reached its maximum capacity.
    #[error("course {course} is full ({enrolled}/{max})")]
    Course {
        /// The full course.
        course: CourseId,
        /// Students currently enrolled.
        enrolled: u32,
        /// The course's maximum capacity.
        max: u32,
    },

    /// The waitlist holds as many entries as it can.
    #[error("waitlist is full ({capacity} entries)")]
    Waitlist {
        /// The waitlist's fixed capacity.
        capacity: usize,
    },

    /// The prerequisite stack overflowed during an eligibility check.
    ///
    /// Prerequisite cycles end here too.
    #[error("prerequisite stack overflow ({capacity} entries)")]
    PrerequisiteStack {
        /// The stack's fixed capacity.
        capacity: usize,
    },

    /// The course already lists the maximum number of prerequisites.
    #[error("course {course} already lists {capacity} prerequisites")]
    Prerequisites {
        /// The course being edited.
        course: CourseId,
        /// The per-course prerequisite limit.
        capacity: usize,
    },
}

/// Coarse classification of [`Error`] for callers that only need to know
/// what kind of failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// An insert collided with an existing key.
    DuplicateKey,
    /// A referenced student, course or enrollment does not exist.
    NotFound,
    /// A bounded structure is full.
    CapacityExceeded,
    /// Prerequisites are not satisfied.
    IneligiblePrerequisite,
    /// The pair is already recorded.
    AlreadyExists,
    /// Nothing to dequeue.
    Empty,
}

impl Error {
    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateStudent(_) | Self::DuplicateCourse(_) => ErrorKind::DuplicateKey,
            Self::UnknownStudent(_) | Self::UnknownCourse(_) | Self::NotEnrolled { .. } => {
                ErrorKind::NotFound
            }
            Self::CapacityExceeded(_) => ErrorKind::CapacityExceeded,
            Self::IneligiblePrerequisite { .. } => ErrorKind::IneligiblePrerequisite,
            Self::AlreadyEnrolled { .. } | Self::AlreadyWaitlisted { .. } => {
                ErrorKind::AlreadyExists
            }
            Self::WaitlistEmpty => ErrorKind::Empty,
        }
    }
}
