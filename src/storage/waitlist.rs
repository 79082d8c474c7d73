//! The capacity waitlist.
//!
//! A fixed-size circular FIFO of (student, course) requests. Only the front
//! entry is ever considered for promotion, so an entry that cannot be enrolled
//! holds up everything behind it.

use serde::Serialize;
use tracing::instrument;

use crate::{
    domain::{
        CapacityExceeded, CourseId, Eligibility, Error, PrerequisiteValidator, StudentId,
        WaitlistEntry,
    },
    storage::{CourseCatalog, EnrollmentLedger, StudentDirectory},
};

/// Why a front entry was removed without being enrolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscardReason {
    /// The course has been dropped from the catalog.
    CourseMissing,
    /// The student has been removed from the directory.
    StudentMissing,
    /// The student is already enrolled in the course.
    AlreadyEnrolled,
}

/// Why a front entry stayed where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockReason {
    /// The course is still at capacity.
    CourseFull {
        /// Current enrollment.
        enrolled: u32,
        /// The course's maximum.
        max: u32,
    },
    /// The student lacks this prerequisite.
    MissingPrerequisite(CourseId),
}

/// What a single promotion attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum DequeueOutcome {
    /// The front entry was removed and enrolled.
    Enrolled {
        /// The promoted request.
        entry: WaitlistEntry,
    },
    /// The front entry was removed because it can no longer apply.
    Discarded {
        /// The removed request.
        entry: WaitlistEntry,
        /// Why it was removed.
        reason: DiscardReason,
    },
    /// The front entry is still waiting. The queue is unchanged.
    Blocked {
        /// The waiting request.
        entry: WaitlistEntry,
        /// What it is waiting for.
        reason: BlockReason,
    },
}

impl DequeueOutcome {
    /// Returns `false` only when the queue was left unchanged.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Blocked { .. })
    }

    /// The entry the attempt looked at.
    #[must_use]
    pub const fn entry(&self) -> WaitlistEntry {
        match self {
            Self::Enrolled { entry }
            | Self::Discarded { entry, .. }
            | Self::Blocked { entry, .. } => *entry,
        }
    }
}

/// Bounded FIFO of enrollment requests.
#[derive(Debug)]
pub struct WaitlistQueue {
    slots: Box<[Option<WaitlistEntry>]>,
    front: usize,
    len: usize,
}

impl WaitlistQueue {
    /// Creates an empty queue holding at most `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity].into_boxed_slice(),
            front: 0,
            len: 0,
        }
    }

    /// Appends a request at the rear.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownStudent`] or [`Error::UnknownCourse`] if either ID is
    ///   not registered.
    /// - [`Error::AlreadyWaitlisted`] if the pair is already queued.
    /// - [`Error::CapacityExceeded`] if the queue is full.
    #[instrument(skip(self, students, catalog))]
    pub fn enqueue(
        &mut self,
        students: &StudentDirectory,
        catalog: &CourseCatalog,
        student: StudentId,
        course: CourseId,
    ) -> Result<(), Error> {
        students.find(student)?;
        if !catalog.contains(course) {
            return Err(Error::UnknownCourse(course));
        }
        if self.contains(student, course) {
            return Err(Error::AlreadyWaitlisted { student, course });
        }
        if self.is_full() {
            return Err(CapacityExceeded::Waitlist {
                capacity: self.capacity(),
            }
            .into());
        }

        let rear = (self.front + self.len) % self.capacity();
        if let Some(slot) = self.slots.get_mut(rear) {
            *slot = Some(WaitlistEntry::new(student, course));
            self.len += 1;
        }

        tracing::debug!(len = self.len, "request waitlisted");
        Ok(())
    }

    /// Attempts to promote the front entry into the ledger.
    ///
    /// The front entry is discarded if its course is gone, left in place if
    /// the course is full or a prerequisite is missing, and otherwise enrolled
    /// and removed. Entries behind the front are never examined.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WaitlistEmpty`] if there is nothing to promote, or a
    /// capacity error if the prerequisite walk overflows. The queue is
    /// unchanged on error.
    #[instrument(skip_all)]
    pub fn promote(
        &mut self,
        students: &StudentDirectory,
        catalog: &mut CourseCatalog,
        ledger: &mut EnrollmentLedger,
        validator: &PrerequisiteValidator,
    ) -> Result<DequeueOutcome, Error> {
        let entry = self.front().ok_or(Error::WaitlistEmpty)?;

        let Some(course) = catalog.lookup(entry.course) else {
            return Ok(self.discard(entry, DiscardReason::CourseMissing));
        };
        if course.is_full() {
            return Ok(DequeueOutcome::Blocked {
                entry,
                reason: BlockReason::CourseFull {
                    enrolled: course.enrolled(),
                    max: course.max_capacity(),
                },
            });
        }
        if let Eligibility::Missing(missing) =
            validator.check(catalog, ledger, entry.student, course)?
        {
            return Ok(DequeueOutcome::Blocked {
                entry,
                reason: BlockReason::MissingPrerequisite(missing),
            });
        }

        if !students.contains(entry.student) {
            return Ok(self.discard(entry, DiscardReason::StudentMissing));
        }
        if ledger.contains(entry.student, entry.course) {
            return Ok(self.discard(entry, DiscardReason::AlreadyEnrolled));
        }

        ledger.enroll(students, catalog, validator, entry.student, entry.course)?;
        self.pop_front();

        tracing::debug!(%entry, "waitlisted request enrolled");
        Ok(DequeueOutcome::Enrolled { entry })
    }

    /// The entry at the front, if any.
    #[must_use]
    pub fn front(&self) -> Option<WaitlistEntry> {
        if self.is_empty() {
            return None;
        }
        self.slots.get(self.front).copied().flatten()
    }

    /// Returns `true` if the pair is queued.
    #[must_use]
    pub fn contains(&self, student: StudentId, course: CourseId) -> bool {
        self.iter()
            .any(|entry| entry.student == student && entry.course == course)
    }

    /// Iterates queued entries from front to rear.
    pub fn iter(&self) -> impl Iterator<Item = WaitlistEntry> + '_ {
        (0..self.len).filter_map(move |offset| {
            let position = (self.front + offset) % self.capacity();
            self.slots.get(position).copied().flatten()
        })
    }

    /// Number of queued entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if no further entry can be queued.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len >= self.capacity()
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn discard(&mut self, entry: WaitlistEntry, reason: DiscardReason) -> DequeueOutcome {
        self.pop_front();
        tracing::warn!(%entry, ?reason, "waitlisted request discarded");
        DequeueOutcome::Discarded { entry, reason }
    }

    fn pop_front(&mut self) -> Option<WaitlistEntry> {
        if self.is_empty() {
            return None;
        }
        let entry = self.slots.get_mut(self.front)?.take();
        self.front = (self.front + 1) % self.capacity();
        self.len -= 1;
        entry
    }
}

impl Default for WaitlistQueue {
    fn default() -> Self {
        Self::with_capacity(crate::domain::Config::default().waitlist_capacity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Course, Student};

    struct Fixture {
        students: StudentDirectory,
        catalog: CourseCatalog,
        ledger: EnrollmentLedger,
        validator: PrerequisiteValidator,
        queue: WaitlistQueue,
    }

    impl Fixture {
        /// Students 1..=12, an open course 100, a one-seat course 200 and a
        /// course 300 that requires 100.
        fn new() -> Self {
            let mut students = StudentDirectory::new();
            for id in 1..=12 {
                students.insert(Student::new(id, format!("s{id}"))).unwrap();
            }
            let mut catalog = CourseCatalog::default();
            catalog.insert(Course::new(100, "Open")).unwrap();
            catalog
                .insert(Course::new(200, "Tiny").with_max_capacity(1))
                .unwrap();
            catalog
                .insert(
                    Course::new(300, "Needs 100")
                        .with_prerequisites([CourseId::new(100)])
                        .unwrap(),
                )
                .unwrap();
            Self {
                students,
                catalog,
                ledger: EnrollmentLedger::new(),
                validator: PrerequisiteValidator::default(),
                queue: WaitlistQueue::default(),
            }
        }

        fn enqueue(&mut self, student: u32, course: u32) -> Result<(), Error> {
            self.queue.enqueue(
                &self.students,
                &self.catalog,
                StudentId::new(student),
                CourseId::new(course),
            )
        }

        fn enroll(&mut self, student: u32, course: u32) -> Result<(), Error> {
            self.ledger.enroll(
                &self.students,
                &mut self.catalog,
                &self.validator,
                StudentId::new(student),
                CourseId::new(course),
            )
        }

        fn promote(&mut self) -> Result<DequeueOutcome, Error> {
            self.queue.promote(
                &self.students,
                &mut self.catalog,
                &mut self.ledger,
                &self.validator,
            )
        }

        fn queued(&self) -> Vec<(u32, u32)> {
            self.queue
                .iter()
                .map(|e| (e.student.get(), e.course.get()))
                .collect()
        }
    }

    fn entry(student: u32, course: u32) -> WaitlistEntry {
        WaitlistEntry::new(StudentId::new(student), CourseId::new(course))
    }

    #[test]
    fn eleventh_request_overflows() {
        let mut fx = Fixture::new();
        for student in 1..=10 {
            fx.enqueue(student, 100).unwrap();
        }

        let error = fx.enqueue(11, 100).unwrap_err();

        assert_eq!(
            error,
            Error::CapacityExceeded(CapacityExceeded::Waitlist { capacity: 10 })
        );
        assert_eq!(fx.queue.len(), 10);
    }

    #[test]
    fn enqueue_validates_references_and_duplicates() {
        let mut fx = Fixture::new();
        assert_eq!(
            fx.enqueue(99, 100).unwrap_err(),
            Error::UnknownStudent(StudentId::new(99))
        );
        assert_eq!(
            fx.enqueue(1, 999).unwrap_err(),
            Error::UnknownCourse(CourseId::new(999))
        );
        fx.enqueue(1, 100).unwrap();
        assert_eq!(
            fx.enqueue(1, 100).unwrap_err(),
            Error::AlreadyWaitlisted {
                student: StudentId::new(1),
                course: CourseId::new(100),
            }
        );
        assert_eq!(fx.queued(), vec![(1, 100)]);
    }

    #[test]
    fn empty_queue_reports_empty() {
        let mut fx = Fixture::new();
        assert_eq!(fx.promote().unwrap_err(), Error::WaitlistEmpty);
    }

    #[test]
    fn promotion_is_first_in_first_out() {
        let mut fx = Fixture::new();
        fx.enqueue(2, 100).unwrap();
        fx.enqueue(1, 100).unwrap();

        assert_eq!(
            fx.promote().unwrap(),
            DequeueOutcome::Enrolled { entry: entry(2, 100) }
        );
        assert_eq!(
            fx.promote().unwrap(),
            DequeueOutcome::Enrolled { entry: entry(1, 100) }
        );
        assert!(fx.queue.is_empty());
        assert_eq!(fx.ledger.count_for(CourseId::new(100)), 2);
    }

    #[test]
    fn full_course_blocks_the_whole_queue() {
        let mut fx = Fixture::new();
        fx.enroll(1, 200).unwrap();
        fx.enqueue(2, 200).unwrap();
        fx.enqueue(3, 100).unwrap();

        let outcome = fx.promote().unwrap();

        assert!(!outcome.is_success());
        assert_eq!(
            outcome,
            DequeueOutcome::Blocked {
                entry: entry(2, 200),
                reason: BlockReason::CourseFull { enrolled: 1, max: 1 },
            }
        );
        assert_eq!(fx.queued(), vec![(2, 200), (3, 100)]);

        // Freeing the seat unblocks the front.
        fx.ledger
            .unenroll(&mut fx.catalog, StudentId::new(1), CourseId::new(200))
            .unwrap();
        assert!(fx.promote().unwrap().is_success());
        assert_eq!(fx.queued(), vec![(3, 100)]);
    }

    #[test]
    fn missing_prerequisite_blocks_without_reordering() {
        let mut fx = Fixture::new();
        fx.enqueue(1, 300).unwrap();

        assert_eq!(
            fx.promote().unwrap(),
            DequeueOutcome::Blocked {
                entry: entry(1, 300),
                reason: BlockReason::MissingPrerequisite(CourseId::new(100)),
            }
        );
        assert_eq!(fx.queue.len(), 1);
    }

    #[test]
    fn dropped_course_is_discarded_as_success() {
        let mut fx = Fixture::new();
        fx.enqueue(1, 200).unwrap();
        fx.enqueue(2, 100).unwrap();
        fx.catalog.remove(CourseId::new(200)).unwrap();

        let outcome = fx.promote().unwrap();

        assert!(outcome.is_success());
        assert_eq!(
            outcome,
            DequeueOutcome::Discarded {
                entry: entry(1, 200),
                reason: DiscardReason::CourseMissing,
            }
        );
        assert_eq!(fx.queued(), vec![(2, 100)]);
    }

    #[test]
    fn deleted_student_and_existing_enrollment_are_discarded() {
        let mut fx = Fixture::new();
        fx.enqueue(1, 100).unwrap();
        fx.enqueue(2, 100).unwrap();
        fx.students.delete(StudentId::new(1)).unwrap();
        fx.enroll(2, 100).unwrap();

        assert_eq!(
            fx.promote().unwrap(),
            DequeueOutcome::Discarded {
                entry: entry(1, 100),
                reason: DiscardReason::StudentMissing,
            }
        );
        assert_eq!(
            fx.promote().unwrap(),
            DequeueOutcome::Discarded {
                entry: entry(2, 100),
                reason: DiscardReason::AlreadyEnrolled,
            }
        );
        assert!(fx.queue.is_empty());
    }

    #[test]
    fn indices_wrap_around_the_backing_store() {
        let mut fx = Fixture::new();
        for round in 0..3 {
            for student in 1..=10 {
                fx.enqueue(student, 100).unwrap();
            }
            assert!(fx.queue.is_full());
            for _ in 0..7 {
                fx.queue.pop_front().unwrap();
            }
            for _ in 0..3 {
                fx.queue.pop_front().unwrap();
            }
            assert!(fx.queue.is_empty(), "round {round}");
        }

        fx.enqueue(5, 100).unwrap();
        fx.enqueue(6, 100).unwrap();
        assert_eq!(fx.queue.front(), Some(entry(5, 100)));
        assert_eq!(fx.queued(), vec![(5, 100), (6, 100)]);
    }

    #[test]
    fn zero_capacity_queue_rejects_every_request() {
        let mut fx = Fixture::new();
        fx.queue = WaitlistQueue::with_capacity(0);
        assert_eq!(
            fx.enqueue(1, 100).unwrap_err(),
            Error::CapacityExceeded(CapacityExceeded::Waitlist { capacity: 0 })
        );
        assert_eq!(fx.queue.iter().count(), 0);
        assert_eq!(fx.promote().unwrap_err(), Error::WaitlistEmpty);
    }
}
