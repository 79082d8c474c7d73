//! Domain types for the records store.
//!
//! Students, courses and the pairs that link them, along with configuration,
//! errors and the prerequisite check.

mod config;
pub use config::Config;

mod course;
pub use course::{Course, CourseId, CreditTier, Prerequisites};

mod eligibility;
pub use eligibility::{Eligibility, PrerequisiteValidator};

mod enrollment;
pub use enrollment::{Enrollment, WaitlistEntry};

/// Error types.
pub mod error;
pub use error::{CapacityExceeded, Error, ErrorKind};

mod student;
pub use student::{Password, Student, StudentId, StudentUpdate};
