//! The in-memory containers that hold students, courses, enrollments and
//! waitlisted requests.

pub mod catalog;
pub use catalog::{CourseCatalog, HashIndex};

pub mod directory;
pub use directory::StudentDirectory;

pub mod ledger;
pub use ledger::EnrollmentLedger;

mod stack;
pub use stack::BoundedStack;

pub mod waitlist;
pub use waitlist::{BlockReason, DequeueOutcome, DiscardReason, WaitlistQueue};
