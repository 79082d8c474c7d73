//! Scripted sessions.
//!
//! A scenario is a TOML file holding an ordered list of `[[step]]` tables.
//! Each step names an operation in its `op` key and carries that operation's
//! arguments:
//!
//! ```toml
//! [[step]]
//! op = "add-student"
//! id = 1
//! name = "Ada Lovelace"
//!
//! [[step]]
//! op = "add-course"
//! id = 101
//! name = "Analytical Engines"
//! max-capacity = 30
//! prerequisites = [100]
//!
//! [[step]]
//! op = "enroll"
//! student = 1
//! course = 101
//! ```

use std::{io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::{
    Registrar,
    domain::{
        Course, CourseId, Eligibility, Enrollment, Error, Password, Student, StudentId,
        StudentUpdate, WaitlistEntry,
    },
    registrar::Audit,
    storage::DequeueOutcome,
};

/// An ordered list of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Scenario {
    /// The steps, in file order.
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// Failure to load a scenario file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read scenario file: {0}")]
    Io(#[from] io::Error),

    /// The file is not a valid scenario.
    #[error("failed to parse scenario file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Scenario {
    /// Reads a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path)?;
        Ok(content.parse()?)
    }
}

impl std::str::FromStr for Scenario {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

/// One operation against a [`Registrar`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case", rename_all_fields = "kebab-case")]
pub enum Step {
    /// Register a student.
    AddStudent {
        /// Student ID.
        id: StudentId,
        /// Full name.
        name: String,
        /// Email address.
        #[serde(default)]
        email: String,
        /// Phone number.
        #[serde(default)]
        phone: String,
        /// Postal address.
        #[serde(default)]
        address: String,
        /// Opaque password.
        #[serde(default)]
        password: Password,
    },
    /// Edit a student's fields. Omitted fields are left alone.
    EditStudent {
        /// Student ID.
        id: StudentId,
        /// New name.
        name: Option<String>,
        /// New email address.
        email: Option<String>,
        /// New phone number.
        phone: Option<String>,
        /// New postal address.
        address: Option<String>,
        /// New password.
        password: Option<Password>,
    },
    /// Remove a student.
    DeleteStudent {
        /// Student ID.
        id: StudentId,
    },
    /// Show one student.
    FindStudent {
        /// Student ID.
        id: StudentId,
    },
    /// Show every student in list order.
    ListStudents,
    /// Sort the student list by ID.
    SortStudents,
    /// Add a course.
    AddCourse {
        /// Course ID.
        id: CourseId,
        /// Course title.
        name: String,
        /// Credit count.
        #[serde(default)]
        credits: u8,
        /// Instructor name.
        #[serde(default)]
        instructor: String,
        /// Maximum capacity, zero for unlimited.
        #[serde(default)]
        max_capacity: u32,
        /// Prerequisite course IDs.
        #[serde(default)]
        prerequisites: Vec<CourseId>,
    },
    /// Remove a course.
    DropCourse {
        /// Course ID.
        id: CourseId,
    },
    /// Show one course, looked up through the index with tree fallback.
    FindCourse {
        /// Course ID.
        id: CourseId,
    },
    /// Show every course in ID order.
    ListCourses,
    /// Enroll a student.
    Enroll {
        /// Student ID.
        student: StudentId,
        /// Course ID.
        course: CourseId,
    },
    /// Remove an enrollment.
    Unenroll {
        /// Student ID.
        student: StudentId,
        /// Course ID.
        course: CourseId,
    },
    /// Show a student's enrollments.
    Enrollments {
        /// Student ID.
        student: StudentId,
    },
    /// Check prerequisites without enrolling.
    Check {
        /// Student ID.
        student: StudentId,
        /// Course ID.
        course: CourseId,
    },
    /// Add a request to the waitlist.
    Waitlist {
        /// Student ID.
        student: StudentId,
        /// Course ID.
        course: CourseId,
    },
    /// Attempt to promote the front of the waitlist.
    Promote,
    /// Show the waitlist.
    ShowWaitlist,
    /// Drop every course index entry.
    ResetIndex,
    /// Rebuild the course index from the tree.
    RebuildIndex,
    /// Look a course up through the index only.
    ProbeIndex {
        /// Course ID.
        id: CourseId,
    },
    /// Check the store's invariants.
    Audit,
}

impl Step {
    /// Applies the step.
    ///
    /// # Errors
    ///
    /// Returns whatever error the underlying operation reports. The registrar
    /// is unchanged in that case.
    #[instrument(skip(registrar))]
    pub fn apply(self, registrar: &mut Registrar) -> Result<Outcome, Error> {
        let outcome = match self {
            Self::AddStudent {
                id,
                name,
                email,
                phone,
                address,
                password,
            } => {
                registrar.add_student(
                    Student::new(id, name)
                        .with_email(email)
                        .with_phone(phone)
                        .with_address(address)
                        .with_password(password),
                )?;
                Outcome::StudentAdded(id)
            }
            Self::EditStudent {
                id,
                name,
                email,
                phone,
                address,
                password,
            } => {
                let update = StudentUpdate {
                    name,
                    email,
                    phone,
                    address,
                    password,
                };
                Outcome::StudentUpdated(registrar.update_student(id, update)?.clone())
            }
            Self::DeleteStudent { id } => Outcome::StudentDeleted(registrar.delete_student(id)?),
            Self::FindStudent { id } => Outcome::Student(registrar.find_student(id)?.clone()),
            Self::ListStudents => Outcome::Students(registrar.students().iter().cloned().collect()),
            Self::SortStudents => Outcome::StudentsSorted {
                passes: registrar.sort_students(),
            },
            Self::AddCourse {
                id,
                name,
                credits,
                instructor,
                max_capacity,
                prerequisites,
            } => {
                let course = Course::new(id, name)
                    .with_credits(credits)
                    .with_instructor(instructor)
                    .with_max_capacity(max_capacity)
                    .with_prerequisites(prerequisites)?;
                registrar.add_course(course)?;
                Outcome::CourseAdded(id)
            }
            Self::DropCourse { id } => Outcome::CourseDropped(registrar.drop_course(id)?),
            Self::FindCourse { id } => Outcome::Course(registrar.find_course(id)?.clone()),
            Self::ListCourses => Outcome::Courses(registrar.courses().cloned().collect()),
            Self::Enroll { student, course } => {
                registrar.enroll(student, course)?;
                Outcome::Enrolled(Enrollment::new(student, course))
            }
            Self::Unenroll { student, course } => {
                registrar.unenroll(student, course)?;
                Outcome::Unenrolled(Enrollment::new(student, course))
            }
            Self::Enrollments { student } => {
                registrar.find_student(student)?;
                Outcome::Enrollments {
                    student,
                    courses: registrar.enrollments_for(student).collect(),
                }
            }
            Self::Check { student, course } => Outcome::Eligibility {
                student,
                course,
                eligibility: registrar.check_eligibility(course, student)?,
            },
            Self::Waitlist { student, course } => {
                registrar.enqueue_waitlist(student, course)?;
                Outcome::Waitlisted(WaitlistEntry::new(student, course))
            }
            Self::Promote => Outcome::Promotion(registrar.dequeue_waitlist()?),
            Self::ShowWaitlist => Outcome::Waitlist(registrar.waitlist().collect()),
            Self::ResetIndex => {
                registrar.reset_index();
                Outcome::IndexReset
            }
            Self::RebuildIndex => {
                let count = registrar.rebuild_index();
                let catalog = registrar.catalog();
                Outcome::IndexRebuilt {
                    count,
                    buckets: catalog.index().bucket_count(),
                    longest_chain: catalog.index().chain_lengths().max().unwrap_or(0),
                    tree_height: catalog.tree_height(),
                }
            }
            Self::ProbeIndex { id } => {
                Outcome::Course(registrar.find_course_in_index(id)?.clone())
            }
            Self::Audit => Outcome::Audit(registrar.audit()),
        };
        Ok(outcome)
    }
}

/// What a successfully applied step produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum Outcome {
    /// A student was registered.
    StudentAdded(StudentId),
    /// A student was edited.
    StudentUpdated(Student),
    /// A student was removed.
    StudentDeleted(Student),
    /// A single student.
    Student(Student),
    /// Students in list order.
    Students(Vec<Student>),
    /// The student list was sorted.
    StudentsSorted {
        /// Bubble passes made.
        passes: usize,
    },
    /// A course was added.
    CourseAdded(CourseId),
    /// A course was removed.
    CourseDropped(Course),
    /// A single course.
    Course(Course),
    /// Courses in ID order.
    Courses(Vec<Course>),
    /// An enrollment was made.
    Enrolled(Enrollment),
    /// An enrollment was removed.
    Unenrolled(Enrollment),
    /// A student's enrollments.
    Enrollments {
        /// The student.
        student: StudentId,
        /// Their courses in enrollment order.
        courses: Vec<CourseId>,
    },
    /// A prerequisite check result.
    Eligibility {
        /// The student.
        student: StudentId,
        /// The course.
        course: CourseId,
        /// The result.
        eligibility: Eligibility,
    },
    /// A request was waitlisted.
    Waitlisted(WaitlistEntry),
    /// A promotion attempt.
    Promotion(DequeueOutcome),
    /// The waitlist from front to rear.
    Waitlist(Vec<WaitlistEntry>),
    /// The course index was cleared.
    IndexReset,
    /// The course index was rebuilt.
    IndexRebuilt {
        /// Courses indexed.
        count: usize,
        /// Buckets in the index.
        buckets: usize,
        /// Entries in the fullest bucket.
        longest_chain: usize,
        /// Height of the course tree.
        tree_height: usize,
    },
    /// An audit report.
    Audit(Audit),
}

impl Outcome {
    /// Returns `false` for outcomes that report something still needing
    /// attention: a blocked promotion, an ineligible check or a dirty audit.
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            Self::Promotion(outcome) => outcome.is_success(),
            Self::Eligibility { eligibility, .. } => eligibility.is_eligible(),
            Self::Audit(audit) => audit.is_clean(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use test_case::test_case;

    use super::*;
    use crate::storage::{BlockReason, DequeueOutcome};

    const ENROLMENT_SESSION: &str = r#"
        [[step]]
        op = "add-student"
        id = 1
        name = "Ada"

        [[step]]
        op = "add-student"
        id = 2
        name = "Grace"
        email = "grace@example.com"

        [[step]]
        op = "add-course"
        id = 101
        name = "Programming"
        credits = 3

        [[step]]
        op = "add-course"
        id = 201
        name = "Compilers"
        max-capacity = 1
        prerequisites = [101]

        [[step]]
        op = "enroll"
        student = 1
        course = 101

        [[step]]
        op = "enroll"
        student = 1
        course = 201

        [[step]]
        op = "enroll"
        student = 2
        course = 101

        [[step]]
        op = "waitlist"
        student = 2
        course = 201

        [[step]]
        op = "promote"
    "#;

    fn run(scenario: Scenario) -> (Registrar, Vec<Result<Outcome, Error>>) {
        let mut registrar = Registrar::default();
        let results = scenario
            .steps
            .into_iter()
            .map(|step| step.apply(&mut registrar))
            .collect();
        (registrar, results)
    }

    #[test]
    fn parses_and_applies_steps_in_order() {
        let scenario: Scenario = ENROLMENT_SESSION.parse().unwrap();
        assert_eq!(scenario.steps.len(), 9);

        let (registrar, results) = run(scenario);

        assert!(results.iter().all(Result::is_ok));
        let last = results.last().unwrap().as_ref().unwrap();
        assert_eq!(
            last,
            &Outcome::Promotion(DequeueOutcome::Blocked {
                entry: WaitlistEntry::new(StudentId::new(2), CourseId::new(201)),
                reason: BlockReason::CourseFull { enrolled: 1, max: 1 },
            })
        );
        assert!(!last.is_success());
        assert_eq!(registrar.waitlist().count(), 1);
        assert_eq!(
            registrar.find_student(StudentId::new(2)).unwrap().email,
            "grace@example.com"
        );
    }

    #[test]
    fn failed_step_reports_error_and_later_steps_still_run() {
        let scenario: Scenario = r#"
            [[step]]
            op = "add-student"
            id = 1
            name = "Ada"

            [[step]]
            op = "add-student"
            id = 1
            name = "Impostor"

            [[step]]
            op = "find-student"
            id = 1
        "#
        .parse()
        .unwrap();

        let (_, results) = run(scenario);

        assert_eq!(
            results[1].as_ref().unwrap_err(),
            &Error::DuplicateStudent(StudentId::new(1))
        );
        match results[2].as_ref().unwrap() {
            Outcome::Student(student) => assert_eq!(student.name, "Ada"),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn edit_student_only_changes_named_fields() {
        let scenario: Scenario = r#"
            [[step]]
            op = "add-student"
            id = 4
            name = "Edsger"
            phone = "555-0100"

            [[step]]
            op = "edit-student"
            id = 4
            address = "Nuenen"
        "#
        .parse()
        .unwrap();

        let (registrar, _) = run(scenario);

        let student = registrar.find_student(StudentId::new(4)).unwrap();
        assert_eq!(student.name, "Edsger");
        assert_eq!(student.phone, "555-0100");
        assert_eq!(student.address, "Nuenen");
    }

    #[test]
    fn too_many_prerequisites_are_rejected() {
        let scenario: Scenario = r#"
            [[step]]
            op = "add-course"
            id = 1
            name = "Everything"
            prerequisites = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]
        "#
        .parse()
        .unwrap();

        let (registrar, results) = run(scenario);

        assert_eq!(
            results[0].as_ref().unwrap_err().kind(),
            crate::domain::ErrorKind::CapacityExceeded
        );
        assert!(registrar.catalog().is_empty());
    }

    #[test]
    fn rebuild_reports_index_and_tree_shape() {
        let mut document = String::new();
        for id in [50, 30, 70, 20] {
            document.push_str(&format!(
                "[[step]]\nop = \"add-course\"\nid = {id}\nname = \"c{id}\"\n\n"
            ));
        }
        document.push_str("[[step]]\nop = \"rebuild-index\"\n");
        let scenario: Scenario = document.parse().unwrap();

        let (_, results) = run(scenario);

        // Every ID lands in bucket 0; 20 hangs below 30, below the root 50.
        assert_eq!(
            results.last().unwrap().as_ref().unwrap(),
            &Outcome::IndexRebuilt {
                count: 4,
                buckets: 10,
                longest_chain: 4,
                tree_height: 3,
            }
        );
    }

    #[test_case("op = \"promote\"", true ; "unit step")]
    #[test_case("op = \"probe-index\"\nid = 3", true ; "step with arguments")]
    #[test_case("op = \"teleport\"", false ; "unknown op")]
    #[test_case("op = \"enroll\"\nstudent = 1", false ; "missing argument")]
    fn step_parsing(body: &str, valid: bool) {
        let document = format!("[[step]]\n{body}\n");
        assert_eq!(document.parse::<Scenario>().is_ok(), valid);
    }

    #[test]
    fn empty_file_is_an_empty_scenario() {
        let scenario: Scenario = "".parse().unwrap();
        assert!(scenario.steps.is_empty());
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ENROLMENT_SESSION.as_bytes()).unwrap();

        let scenario = Scenario::load(file.path()).unwrap();

        assert_eq!(scenario.steps.len(), 9);
        assert_eq!(
            scenario.steps[0],
            Step::AddStudent {
                id: StudentId::new(1),
                name: "Ada".to_string(),
                email: String::new(),
                phone: String::new(),
                address: String::new(),
                password: Password::default(),
            }
        );
    }

    #[test]
    fn load_missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = Scenario::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(error, LoadError::Io(_)));
    }
}
