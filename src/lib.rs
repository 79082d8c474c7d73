//! In-memory academic records.
//!
//! Students, courses, enrollments, prerequisite checks and a capacity
//! waitlist, held in purpose-built containers that refer to one another by ID.
//! [`Registrar`] is the entry point and keeps the containers consistent.

pub mod domain;
pub use domain::{
    CapacityExceeded, Config, Course, CourseId, Eligibility, Enrollment, Error, ErrorKind,
    Student, StudentId, StudentUpdate, WaitlistEntry,
};

mod registrar;
pub use registrar::{Audit, CountMismatch, Registrar};

pub mod scenario;
pub use scenario::{Outcome, Scenario, Step};

pub mod storage;
pub use storage::DequeueOutcome;
