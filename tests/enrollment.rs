//! Enrollment, eligibility and waitlist behaviour through the public API.

use proptest::prelude::*;
use registrar::{
    CapacityExceeded, Course, CourseId, DequeueOutcome, Eligibility, Error, Registrar, Student,
    StudentId, domain::ErrorKind,
};

const STUDENTS: u32 = 6;
const COURSES: u32 = 4;

/// Six students and four courses. Course 3 holds two students and course 2
/// requires course 0.
fn campus() -> Registrar {
    let mut registrar = Registrar::default();
    for id in 0..STUDENTS {
        registrar
            .add_student(Student::new(id, format!("student {id}")))
            .unwrap();
    }
    registrar.add_course(Course::new(0, "Basics")).unwrap();
    registrar.add_course(Course::new(1, "Elective")).unwrap();
    registrar
        .add_course(
            Course::new(2, "Follow-up")
                .with_prerequisites([CourseId::new(0)])
                .unwrap(),
        )
        .unwrap();
    registrar
        .add_course(Course::new(3, "Seminar").with_max_capacity(2))
        .unwrap();
    registrar
}

fn enrolled(registrar: &Registrar, course: u32) -> u32 {
    registrar.find_course(CourseId::new(course)).unwrap().enrolled()
}

proptest! {
    #[test]
    fn enroll_then_unenroll_restores_the_count(
        setup in prop::collection::vec((0..STUDENTS, 0..COURSES), 0..20),
        student in 0..STUDENTS,
        course in 0..COURSES,
    ) {
        let mut registrar = campus();
        for (s, c) in setup {
            let _ = registrar.enroll(StudentId::new(s), CourseId::new(c));
        }
        let before = enrolled(&registrar, course);
        let ledger_before = registrar.ledger().len();

        if registrar.enroll(StudentId::new(student), CourseId::new(course)).is_ok() {
            prop_assert_eq!(enrolled(&registrar, course), before + 1);
            registrar.unenroll(StudentId::new(student), CourseId::new(course)).unwrap();
            prop_assert!(!registrar.ledger().contains(StudentId::new(student), CourseId::new(course)));
        }

        prop_assert_eq!(enrolled(&registrar, course), before);
        prop_assert_eq!(registrar.ledger().len(), ledger_before);
        prop_assert!(registrar.audit().is_clean());
    }

    #[test]
    fn enrolled_counts_always_match_the_ledger(
        ops in prop::collection::vec((any::<bool>(), 0..STUDENTS, 0..COURSES), 0..60),
    ) {
        let mut registrar = campus();
        for (enroll, s, c) in ops {
            let (student, course) = (StudentId::new(s), CourseId::new(c));
            if enroll {
                let _ = registrar.enroll(student, course);
            } else {
                let _ = registrar.unenroll(student, course);
            }
            for c in 0..COURSES {
                let id = CourseId::new(c);
                prop_assert_eq!(
                    usize::try_from(enrolled(&registrar, c)).unwrap(),
                    registrar.ledger().count_for(id)
                );
                let course = registrar.find_course(id).unwrap();
                prop_assert!(course.max_capacity() == 0 || course.enrolled() <= course.max_capacity());
            }
        }
    }

    #[test]
    fn duplicate_student_never_changes_the_directory(id in 0..STUDENTS, name in "[a-z]{1,8}") {
        let mut registrar = campus();
        let before: Vec<_> = registrar.students().iter().cloned().collect();

        let error = registrar.add_student(Student::new(id, name)).unwrap_err();

        prop_assert_eq!(error, Error::DuplicateStudent(StudentId::new(id)));
        let after: Vec<_> = registrar.students().iter().cloned().collect();
        prop_assert_eq!(before, after);
    }
}

#[test]
fn course_without_prerequisites_is_open_to_every_student() {
    let registrar = campus();
    for student in 0..STUDENTS {
        assert_eq!(
            registrar
                .check_eligibility(CourseId::new(1), StudentId::new(student))
                .unwrap(),
            Eligibility::Eligible
        );
    }
}

#[test]
fn transitive_chain_requires_the_middle_link() {
    let mut registrar = Registrar::default();
    registrar.add_student(Student::new(1, "Ada")).unwrap();
    registrar.add_course(Course::new(10, "A")).unwrap();
    registrar
        .add_course(
            Course::new(20, "B")
                .with_prerequisites([CourseId::new(10)])
                .unwrap(),
        )
        .unwrap();
    registrar
        .add_course(
            Course::new(30, "C")
                .with_prerequisites([CourseId::new(20)])
                .unwrap(),
        )
        .unwrap();
    registrar
        .enroll(StudentId::new(1), CourseId::new(10))
        .unwrap();

    assert_eq!(
        registrar
            .check_eligibility(CourseId::new(30), StudentId::new(1))
            .unwrap(),
        Eligibility::Missing(CourseId::new(20))
    );
    assert_eq!(
        registrar
            .enroll(StudentId::new(1), CourseId::new(30))
            .unwrap_err()
            .kind(),
        ErrorKind::IneligiblePrerequisite
    );
}

#[test]
fn waitlist_bounds_and_head_of_line_blocking() {
    let mut registrar = Registrar::default();
    for id in 1..=11 {
        registrar
            .add_student(Student::new(id, format!("student {id}")))
            .unwrap();
    }
    registrar
        .add_course(Course::new(7, "Full").with_max_capacity(1))
        .unwrap();
    registrar.add_course(Course::new(8, "Open")).unwrap();

    assert_eq!(registrar.dequeue_waitlist().unwrap_err(), Error::WaitlistEmpty);

    registrar.enroll(StudentId::new(1), CourseId::new(7)).unwrap();
    registrar
        .enqueue_waitlist(StudentId::new(2), CourseId::new(7))
        .unwrap();
    for id in 3..=11 {
        registrar
            .enqueue_waitlist(StudentId::new(id), CourseId::new(8))
            .unwrap();
    }
    assert_eq!(
        registrar
            .enqueue_waitlist(StudentId::new(1), CourseId::new(8))
            .unwrap_err(),
        Error::CapacityExceeded(CapacityExceeded::Waitlist { capacity: 10 })
    );

    let front = registrar.waitlist().next();
    let outcome = registrar.dequeue_waitlist().unwrap();

    assert!(matches!(outcome, DequeueOutcome::Blocked { .. }));
    assert!(!outcome.is_success());
    assert_eq!(registrar.waitlist().count(), 10);
    assert_eq!(registrar.waitlist().next(), front);
    // Nobody behind the blocked front was enrolled in the open course.
    assert_eq!(enrolled(&registrar, 8), 0);
}
