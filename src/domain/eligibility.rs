use serde::Serialize;
use tracing::instrument;

use crate::{
    domain::{Course, CourseId, Prerequisites, StudentId, error::CapacityExceeded},
    storage::{BoundedStack, CourseCatalog, EnrollmentLedger},
};

/// Result of a prerequisite check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "missing", rename_all = "kebab-case")]
pub enum Eligibility {
    /// Every transitive prerequisite has an active enrollment.
    Eligible,
    /// The first prerequisite found without an enrollment.
    Missing(CourseId),
}

impl Eligibility {
    /// Returns `true` for [`Eligibility::Eligible`].
    #[must_use]
    pub const fn is_eligible(self) -> bool {
        matches!(self, Self::Eligible)
    }
}

/// Checks a student's enrollments against a course's prerequisites.
///
/// A prerequisite counts as satisfied when the student currently holds an
/// enrollment for it. Satisfied prerequisites have their own prerequisites
/// checked in turn, using a stack of fixed capacity. The walk stops at the
/// first unsatisfied prerequisite.
///
/// Cycles are not detected as such. A walk that overflows the stack, or that
/// follows a chain longer than the catalog has courses, can only be going
/// round a cycle and is reported as [`CapacityExceeded::PrerequisiteStack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrerequisiteValidator {
    stack_capacity: usize,
}

impl PrerequisiteValidator {
    /// Creates a validator whose work stack holds `stack_capacity` IDs.
    #[must_use]
    pub const fn new(stack_capacity: usize) -> Self {
        Self { stack_capacity }
    }

    /// The work stack's capacity.
    #[must_use]
    pub const fn stack_capacity(&self) -> usize {
        self.stack_capacity
    }

    /// Checks whether `student` may take `course`.
    ///
    /// Prerequisite IDs that are not in the catalog still need an enrollment
    /// but add nothing further to the walk.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityExceeded::PrerequisiteStack`] if the walk needs more
    /// than [`PrerequisiteValidator::stack_capacity`] pending IDs at once, or
    /// if it goes round a cycle of satisfied prerequisites.
    #[instrument(skip(self, catalog, ledger, course), fields(course = %course.id()))]
    pub fn check(
        &self,
        catalog: &CourseCatalog,
        ledger: &EnrollmentLedger,
        student: StudentId,
        course: &Course,
    ) -> Result<Eligibility, CapacityExceeded> {
        let mut pending = BoundedStack::with_capacity(self.stack_capacity);
        self.push_all(&mut pending, course.prerequisites(), 1)?;

        while let Some((prerequisite, depth)) = pending.pop() {
            if !ledger.contains(student, prerequisite) {
                tracing::debug!(missing = %prerequisite, "prerequisite not met");
                return Ok(Eligibility::Missing(prerequisite));
            }
            let Some(required) = catalog.lookup(prerequisite) else {
                continue;
            };
            if depth >= catalog.len() {
                tracing::warn!(%prerequisite, "prerequisite chain revisits a course");
                return Err(self.overflow());
            }
            self.push_all(&mut pending, required.prerequisites(), depth + 1)?;
        }

        Ok(Eligibility::Eligible)
    }

    fn push_all(
        &self,
        pending: &mut BoundedStack<(CourseId, usize)>,
        prerequisites: &Prerequisites,
        depth: usize,
    ) -> Result<(), CapacityExceeded> {
        for id in prerequisites.iter() {
            pending.push((id, depth)).map_err(|_| self.overflow())?;
        }
        Ok(())
    }

    const fn overflow(&self) -> CapacityExceeded {
        CapacityExceeded::PrerequisiteStack {
            capacity: self.stack_capacity,
        }
    }
}

impl Default for PrerequisiteValidator {
    fn default() -> Self {
        Self::new(crate::domain::Config::default().prerequisite_stack_capacity())
    }
}
