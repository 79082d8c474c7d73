//! The records store as a whole.
//!
//! [`Registrar`] owns every container and is the only way callers change
//! them, so operations that touch more than one container happen in a single
//! call.

use tracing::instrument;

use crate::{
    domain::{
        Config, Course, CourseId, Eligibility, Error, PrerequisiteValidator, Student, StudentId,
        StudentUpdate, WaitlistEntry,
    },
    storage::{CourseCatalog, DequeueOutcome, EnrollmentLedger, StudentDirectory, WaitlistQueue},
};

mod audit;
pub use audit::{Audit, CountMismatch};

/// Students, courses, enrollments and the waitlist, kept consistent with one
/// another.
#[derive(Debug)]
pub struct Registrar {
    config: Config,
    students: StudentDirectory,
    catalog: CourseCatalog,
    ledger: EnrollmentLedger,
    validator: PrerequisiteValidator,
    waitlist: WaitlistQueue,
}

impl Registrar {
    /// Creates an empty store sized by `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            students: StudentDirectory::new(),
            catalog: CourseCatalog::new(config.index_buckets()),
            ledger: EnrollmentLedger::new(),
            validator: PrerequisiteValidator::new(config.prerequisite_stack_capacity()),
            waitlist: WaitlistQueue::with_capacity(config.waitlist_capacity()),
            config,
        }
    }

    /// The configuration the store was built with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    // Students

    /// Registers a student.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateStudent`] if the ID is taken.
    pub fn add_student(&mut self, student: Student) -> Result<(), Error> {
        self.students.insert(student)
    }

    /// Edits a student's fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStudent`] if no student has this ID.
    pub fn update_student(
        &mut self,
        id: StudentId,
        update: StudentUpdate,
    ) -> Result<&Student, Error> {
        self.students.update(id, update)
    }

    /// Removes a student.
    ///
    /// Enrollments and waitlist entries for the student are left in place.
    /// [`Registrar::audit`] reports them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStudent`] if no student has this ID.
    pub fn delete_student(&mut self, id: StudentId) -> Result<Student, Error> {
        self.students.delete(id)
    }

    /// Looks a student up.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStudent`] if no student has this ID.
    pub fn find_student(&self, id: StudentId) -> Result<&Student, Error> {
        self.students.find(id)
    }

    /// The student directory, in list order.
    #[must_use]
    pub const fn students(&self) -> &StudentDirectory {
        &self.students
    }

    /// Sorts the student directory by ID. Returns the number of passes made.
    pub fn sort_students(&mut self) -> usize {
        self.students.sort_by_id()
    }

    // Courses

    /// Adds a course to the catalog and its index.
    ///
    /// The course starts with the enrolled count it was built with. If its ID
    /// belonged to a dropped course, that course's ledger entries now count
    /// against this one in the ledger but not in the enrolled count, and
    /// [`Registrar::audit`] reports the mismatch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateCourse`] if the ID is taken.
    pub fn add_course(&mut self, course: Course) -> Result<(), Error> {
        self.catalog.insert(course)
    }

    /// Removes a course from the catalog and its index.
    ///
    /// Enrollments and waitlist entries for the course are left in place.
    /// The waitlist discards its entries when they reach the front.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCourse`] if the catalog holds no such course.
    pub fn drop_course(&mut self, id: CourseId) -> Result<Course, Error> {
        self.catalog.remove(id)
    }

    /// Looks a course up through the index, falling back to the tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCourse`] if the catalog holds no such course.
    pub fn find_course(&self, id: CourseId) -> Result<&Course, Error> {
        self.catalog.lookup(id).ok_or(Error::UnknownCourse(id))
    }

    /// Looks a course up through the index alone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCourse`] if the index has no valid entry for
    /// the ID, whether or not the tree holds the course.
    pub fn find_course_in_index(&self, id: CourseId) -> Result<&Course, Error> {
        self.catalog.lookup_indexed(id).ok_or(Error::UnknownCourse(id))
    }

    /// Courses in ascending ID order.
    pub fn courses(&self) -> impl Iterator<Item = &Course> + '_ {
        self.catalog.iter()
    }

    /// The course catalog.
    #[must_use]
    pub const fn catalog(&self) -> &CourseCatalog {
        &self.catalog
    }

    // Enrollment

    /// Enrolls a student in a course.
    ///
    /// A full course is reported as an error. Waitlisting is up to the
    /// caller.
    ///
    /// # Errors
    ///
    /// See [`EnrollmentLedger::enroll`].
    pub fn enroll(&mut self, student: StudentId, course: CourseId) -> Result<(), Error> {
        self.ledger.enroll(
            &self.students,
            &mut self.catalog,
            &self.validator,
            student,
            course,
        )
    }

    /// Removes an enrollment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotEnrolled`] if the pair is not enrolled.
    pub fn unenroll(&mut self, student: StudentId, course: CourseId) -> Result<(), Error> {
        self.ledger
            .unenroll(&mut self.catalog, student, course)
            .map(|_| ())
    }

    /// The courses a student is enrolled in, in enrollment order.
    pub fn enrollments_for(&self, student: StudentId) -> impl Iterator<Item = CourseId> + '_ {
        self.ledger.courses_for(student)
    }

    /// The enrollment ledger.
    #[must_use]
    pub const fn ledger(&self) -> &EnrollmentLedger {
        &self.ledger
    }

    /// Checks a student's prerequisites for a course without enrolling.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStudent`] or [`Error::UnknownCourse`] for
    /// unresolved IDs, or a capacity error if the prerequisite walk
    /// overflows.
    #[instrument(skip(self))]
    pub fn check_eligibility(
        &self,
        course: CourseId,
        student: StudentId,
    ) -> Result<Eligibility, Error> {
        self.students.find(student)?;
        let course = self.find_course(course)?;
        Ok(self
            .validator
            .check(&self.catalog, &self.ledger, student, course)?)
    }

    // Waitlist

    /// Queues a request for a course.
    ///
    /// # Errors
    ///
    /// See [`WaitlistQueue::enqueue`].
    pub fn enqueue_waitlist(&mut self, student: StudentId, course: CourseId) -> Result<(), Error> {
        self.waitlist
            .enqueue(&self.students, &self.catalog, student, course)
    }

    /// Makes one attempt to promote the front of the waitlist.
    ///
    /// # Errors
    ///
    /// See [`WaitlistQueue::promote`].
    pub fn dequeue_waitlist(&mut self) -> Result<DequeueOutcome, Error> {
        let outcome = self.waitlist.promote(
            &self.students,
            &mut self.catalog,
            &mut self.ledger,
            &self.validator,
        )?;
        tracing::info!(
            entry = %outcome.entry(),
            success = outcome.is_success(),
            "waitlist promotion attempted"
        );
        Ok(outcome)
    }

    /// Waitlisted requests from front to rear.
    pub fn waitlist(&self) -> impl Iterator<Item = WaitlistEntry> + '_ {
        self.waitlist.iter()
    }

    // Index maintenance

    /// Drops every course index entry. Lookups keep working through the tree.
    pub fn reset_index(&mut self) {
        self.catalog.reset_index();
    }

    /// Rebuilds the course index from the tree. Returns the number of courses
    /// indexed.
    pub fn rebuild_index(&mut self) -> usize {
        self.catalog.rebuild_index()
    }

    /// Checks the cross-container invariants without changing anything.
    #[must_use]
    pub fn audit(&self) -> Audit {
        Audit::of(self)
    }
}

impl Default for Registrar {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{CapacityExceeded, ErrorKind},
        storage::BlockReason,
    };

    fn registrar() -> Registrar {
        let mut registrar = Registrar::default();
        for (id, name) in [(1, "Ada"), (2, "Grace"), (3, "Edsger")] {
            registrar.add_student(Student::new(id, name)).unwrap();
        }
        registrar
            .add_course(Course::new(101, "Programming").with_credits(3))
            .unwrap();
        registrar
            .add_course(
                Course::new(201, "Data Structures")
                    .with_max_capacity(1)
                    .with_prerequisites([CourseId::new(101)])
                    .unwrap(),
            )
            .unwrap();
        registrar
    }

    #[test]
    fn waitlisted_student_is_enrolled_once_a_seat_frees_up() {
        let mut registrar = registrar();
        for student in [1, 2] {
            registrar
                .enroll(StudentId::new(student), CourseId::new(101))
                .unwrap();
        }
        registrar
            .enroll(StudentId::new(1), CourseId::new(201))
            .unwrap();

        let error = registrar
            .enroll(StudentId::new(2), CourseId::new(201))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::CapacityExceeded);
        registrar
            .enqueue_waitlist(StudentId::new(2), CourseId::new(201))
            .unwrap();

        let blocked = registrar.dequeue_waitlist().unwrap();
        assert_eq!(
            blocked,
            DequeueOutcome::Blocked {
                entry: WaitlistEntry::new(StudentId::new(2), CourseId::new(201)),
                reason: BlockReason::CourseFull { enrolled: 1, max: 1 },
            }
        );

        registrar
            .unenroll(StudentId::new(1), CourseId::new(201))
            .unwrap();
        let promoted = registrar.dequeue_waitlist().unwrap();

        assert!(promoted.is_success());
        assert_eq!(registrar.waitlist().count(), 0);
        assert_eq!(
            registrar
                .enrollments_for(StudentId::new(2))
                .collect::<Vec<_>>(),
            vec![CourseId::new(101), CourseId::new(201)]
        );
        assert!(registrar.audit().is_clean());
    }

    #[test]
    fn check_eligibility_reports_the_missing_course() {
        let registrar = registrar();
        assert_eq!(
            registrar
                .check_eligibility(CourseId::new(201), StudentId::new(3))
                .unwrap(),
            Eligibility::Missing(CourseId::new(101))
        );
        assert!(
            registrar
                .check_eligibility(CourseId::new(101), StudentId::new(3))
                .unwrap()
                .is_eligible()
        );
    }

    #[test]
    fn check_eligibility_resolves_both_ids() {
        let registrar = registrar();
        assert_eq!(
            registrar
                .check_eligibility(CourseId::new(101), StudentId::new(9))
                .unwrap_err(),
            Error::UnknownStudent(StudentId::new(9))
        );
        assert_eq!(
            registrar
                .check_eligibility(CourseId::new(999), StudentId::new(1))
                .unwrap_err(),
            Error::UnknownCourse(CourseId::new(999))
        );
    }

    #[test]
    fn ineligible_enrollment_names_the_prerequisite() {
        let mut registrar = registrar();
        assert_eq!(
            registrar
                .enroll(StudentId::new(3), CourseId::new(201))
                .unwrap_err(),
            Error::IneligiblePrerequisite {
                student: StudentId::new(3),
                course: CourseId::new(201),
                missing: CourseId::new(101),
            }
        );
    }

    #[test]
    fn index_probe_misses_after_reset_until_rebuilt() {
        let mut registrar = registrar();
        registrar.reset_index();

        assert!(registrar.find_course_in_index(CourseId::new(101)).is_err());
        assert_eq!(
            registrar.find_course(CourseId::new(101)).unwrap().name,
            "Programming"
        );

        assert_eq!(registrar.rebuild_index(), 2);
        assert_eq!(
            registrar
                .find_course_in_index(CourseId::new(201))
                .unwrap()
                .name,
            "Data Structures"
        );
    }

    #[test]
    fn deletes_do_not_cascade() {
        let mut registrar = registrar();
        registrar
            .enroll(StudentId::new(1), CourseId::new(101))
            .unwrap();
        registrar.delete_student(StudentId::new(1)).unwrap();

        assert_eq!(registrar.ledger().len(), 1);
        assert_eq!(registrar.audit().dangling_enrollments.len(), 1);
    }

    #[test]
    fn reused_course_id_inherits_the_old_ledger_entries() {
        let mut registrar = registrar();
        let logic = CourseId::new(5);
        registrar.add_course(Course::new(5, "Logic")).unwrap();
        registrar.enroll(StudentId::new(1), logic).unwrap();

        registrar.drop_course(logic).unwrap();
        registrar
            .add_course(Course::new(5, "Logic II").with_max_capacity(1))
            .unwrap();
        registrar.enroll(StudentId::new(2), logic).unwrap();

        assert_eq!(registrar.find_course(logic).unwrap().enrolled(), 1);
        assert_eq!(registrar.ledger().count_for(logic), 2);
        assert_eq!(
            registrar.enroll(StudentId::new(1), logic).unwrap_err().kind(),
            ErrorKind::CapacityExceeded
        );
        assert_eq!(
            registrar.audit().count_mismatches,
            vec![CountMismatch {
                course: logic,
                recorded: 1,
                ledger: 2,
            }]
        );
    }

    #[test]
    fn capacity_is_configurable() {
        let mut registrar = Registrar::new(Config::default().with_waitlist_capacity(1));
        registrar.add_student(Student::new(1, "Ada")).unwrap();
        registrar.add_student(Student::new(2, "Grace")).unwrap();
        registrar.add_course(Course::new(5, "Logic")).unwrap();
        registrar
            .enqueue_waitlist(StudentId::new(1), CourseId::new(5))
            .unwrap();

        assert_eq!(
            registrar
                .enqueue_waitlist(StudentId::new(2), CourseId::new(5))
                .unwrap_err(),
            Error::CapacityExceeded(CapacityExceeded::Waitlist { capacity: 1 })
        );
    }
}
