//! The enrollment ledger.
//!
//! A doubly linked list of active (student, course) pairs in the order they
//! were enrolled. Links live in an arena and refer to each other by index, and
//! the list keeps both ends so appends are constant time.

use tracing::instrument;

use crate::{
    domain::{CourseId, Eligibility, Enrollment, Error, PrerequisiteValidator, StudentId},
    storage::{CourseCatalog, StudentDirectory},
};

#[derive(Debug)]
struct Link {
    enrollment: Enrollment,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Active enrollments, in enrollment order.
#[derive(Debug, Default)]
pub struct EnrollmentLedger {
    links: Vec<Option<Link>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl EnrollmentLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            links: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Enrolls a student in a course.
    ///
    /// Checks run in this order, and the first failure is returned:
    ///
    /// 1. the student is registered ([`Error::UnknownStudent`])
    /// 2. the course is in the catalog ([`Error::UnknownCourse`])
    /// 3. prerequisites are met ([`Error::IneligiblePrerequisite`], or a
    ///    capacity error if the prerequisite stack overflows)
    /// 4. the course has room ([`Error::CapacityExceeded`])
    /// 5. the pair is not already enrolled ([`Error::AlreadyEnrolled`])
    ///
    /// On success the pair is appended and the course's enrolled count goes
    /// up by one. A full course is reported, not waitlisted.
    ///
    /// # Errors
    ///
    /// See above. Nothing is modified on failure.
    #[instrument(skip(self, students, catalog, validator))]
    pub fn enroll(
        &mut self,
        students: &StudentDirectory,
        catalog: &mut CourseCatalog,
        validator: &PrerequisiteValidator,
        student: StudentId,
        course: CourseId,
    ) -> Result<(), Error> {
        students.find(student)?;
        let target = catalog.lookup(course).ok_or(Error::UnknownCourse(course))?;

        if let Eligibility::Missing(missing) = validator.check(catalog, self, student, target)? {
            return Err(Error::IneligiblePrerequisite {
                student,
                course,
                missing,
            });
        }

        target.check_capacity()?;

        if self.contains(student, course) {
            return Err(Error::AlreadyEnrolled { student, course });
        }

        self.push_back(Enrollment::new(student, course));
        if let Some(target) = catalog.lookup_mut(course) {
            target.increment_enrolled();
        }

        tracing::debug!("student enrolled");
        Ok(())
    }

    /// Removes an enrollment and decrements the course's enrolled count.
    ///
    /// The count never drops below zero. If the course has since been removed
    /// from the catalog the entry is still removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotEnrolled`] if the pair is not in the ledger.
    #[instrument(skip(self, catalog))]
    pub fn unenroll(
        &mut self,
        catalog: &mut CourseCatalog,
        student: StudentId,
        course: CourseId,
    ) -> Result<Enrollment, Error> {
        let position = self
            .position(student, course)
            .ok_or(Error::NotEnrolled { student, course })?;
        let enrollment = self
            .unlink(position)
            .ok_or(Error::NotEnrolled { student, course })?;

        if let Some(target) = catalog.lookup_mut(course) {
            target.decrement_enrolled();
        }

        tracing::debug!("student unenrolled");
        Ok(enrollment)
    }

    /// Returns `true` if the pair is enrolled.
    #[must_use]
    pub fn contains(&self, student: StudentId, course: CourseId) -> bool {
        self.position(student, course).is_some()
    }

    /// The courses a student is enrolled in, in enrollment order.
    pub fn courses_for(&self, student: StudentId) -> impl Iterator<Item = CourseId> + '_ {
        self.iter()
            .filter(move |enrollment| enrollment.student == student)
            .map(|enrollment| enrollment.course)
    }

    /// Number of ledger entries for a course.
    #[must_use]
    pub fn count_for(&self, course: CourseId) -> usize {
        self.iter()
            .filter(|enrollment| enrollment.course == course)
            .count()
    }

    /// Iterates every enrollment from oldest to newest.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            ledger: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    /// Number of enrollments.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no enrollments.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn link(&self, index: usize) -> Option<&Link> {
        self.links.get(index)?.as_ref()
    }

    fn link_mut(&mut self, index: usize) -> Option<&mut Link> {
        self.links.get_mut(index)?.as_mut()
    }

    fn position(&self, student: StudentId, course: CourseId) -> Option<usize> {
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let link = self.link(index)?;
            if link.enrollment.is(student, course) {
                return Some(index);
            }
            cursor = link.next;
        }
        None
    }

    fn push_back(&mut self, enrollment: Enrollment) {
        let link = Link {
            enrollment,
            prev: self.tail,
            next: None,
        };
        let index = match self.free.pop() {
            Some(index) => {
                if let Some(cell) = self.links.get_mut(index) {
                    *cell = Some(link);
                }
                index
            }
            None => {
                self.links.push(Some(link));
                self.links.len() - 1
            }
        };

        match self.tail.and_then(|tail| self.link_mut(tail)) {
            Some(tail) => tail.next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;
    }

    fn unlink(&mut self, index: usize) -> Option<Enrollment> {
        let link = self.links.get_mut(index)?.take()?;
        self.free.push(index);

        match link.prev.and_then(|prev| self.link_mut(prev)) {
            Some(prev) => prev.next = link.next,
            None => self.head = link.next,
        }
        match link.next.and_then(|next| self.link_mut(next)) {
            Some(next) => next.prev = link.prev,
            None => self.tail = link.prev,
        }

        self.len -= 1;
        Some(link.enrollment)
    }
}

impl<'a> IntoIterator for &'a EnrollmentLedger {
    type Item = &'a Enrollment;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the enrollments in an [`EnrollmentLedger`].
///
/// Walks the `next` links from the front and the `prev` links from the back.
#[derive(Debug)]
pub struct Iter<'a> {
    ledger: &'a EnrollmentLedger,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Enrollment;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let link = self.ledger.link(self.front?)?;
        self.front = link.next;
        self.remaining -= 1;
        Some(&link.enrollment)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let link = self.ledger.link(self.back?)?;
        self.back = link.prev;
        self.remaining -= 1;
        Some(&link.enrollment)
    }
}
