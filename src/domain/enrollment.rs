use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{CourseId, StudentId};

/// An active (student, course) enrollment.
///
/// Both sides are plain IDs: an enrollment does not keep its student or course
/// alive, and removing either leaves the enrollment in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Enrollment {
    /// The enrolled student.
    pub student: StudentId,
    /// The course enrolled in.
    pub course: CourseId,
}

impl Enrollment {
    /// Pairs a student with a course.
    #[must_use]
    pub const fn new(student: StudentId, course: CourseId) -> Self {
        Self { student, course }
    }

    /// Returns `true` if this is the given pair.
    #[must_use]
    pub fn is(&self, student: StudentId, course: CourseId) -> bool {
        self.student == student && self.course == course
    }
}

impl fmt::Display for Enrollment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "student {} in course {}", self.student, self.course)
    }
}

/// A pending request to join a full course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaitlistEntry {
    /// The waiting student.
    pub student: StudentId,
    /// The requested course.
    pub course: CourseId,
}

impl WaitlistEntry {
    /// Pairs a student with the course they are waiting for.
    #[must_use]
    pub const fn new(student: StudentId, course: CourseId) -> Self {
        Self { student, course }
    }
}

impl fmt::Display for WaitlistEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "student {} for course {}", self.student, self.course)
    }
}
