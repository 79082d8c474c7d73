//! Text and JSON rendering of step results.

use registrar::{
    Audit, Course, DequeueOutcome, Eligibility, Error, Outcome, Student,
    storage::{BlockReason, DiscardReason},
};
use serde_json::json;

use super::terminal::Tone;

/// One line of JSON describing the result of step `index` (1-based).
pub fn json(index: usize, result: &Result<Outcome, Error>) -> anyhow::Result<String> {
    let value = match result {
        Ok(outcome) => json!({
            "step": index,
            "success": outcome.is_success(),
            "outcome": outcome,
        }),
        Err(error) => json!({
            "step": index,
            "success": false,
            "error": {
                "kind": error.kind(),
                "message": error.to_string(),
            },
        }),
    };
    Ok(serde_json::to_string(&value)?)
}

/// Human-readable rendering of a step result.
pub fn text(result: &Result<Outcome, Error>) -> String {
    match result {
        Ok(outcome) => outcome_text(outcome),
        Err(error) => Tone::of_error(error.kind()).paint(format!("✗ {error}")),
    }
}

fn outcome_text(outcome: &Outcome) -> String {
    let tone = Tone::of_outcome(outcome);
    match outcome {
        Outcome::StudentAdded(id) => tone.paint(format!("✅ Added student {id}")),
        Outcome::StudentUpdated(student) => {
            format!("{}\n{}", tone.paint("✅ Updated student"), student_card(student))
        }
        Outcome::StudentDeleted(student) => tone.paint(format!(
            "✅ Deleted student {} ({})",
            student.id(),
            student.name
        )),
        Outcome::Student(student) => student_card(student),
        Outcome::Students(students) => student_table(students),
        Outcome::StudentsSorted { passes } => {
            tone.paint(format!("✅ Sorted students by ID ({passes} passes)"))
        }
        Outcome::CourseAdded(id) => tone.paint(format!("✅ Added course {id}")),
        Outcome::CourseDropped(course) => tone.paint(format!(
            "✅ Dropped course {} ({})",
            course.id(),
            course.name
        )),
        Outcome::Course(course) => course_card(course),
        Outcome::Courses(courses) => course_table(courses),
        Outcome::Enrolled(enrollment) => tone.paint(format!("✅ Enrolled {enrollment}")),
        Outcome::Unenrolled(enrollment) => tone.paint(format!("✅ Unenrolled {enrollment}")),
        Outcome::Enrollments { student, courses } => {
            if courses.is_empty() {
                Tone::Muted.paint(format!("Student {student} has no enrollments"))
            } else {
                let courses: Vec<_> = courses.iter().map(ToString::to_string).collect();
                format!("Student {student} is enrolled in: {}", courses.join(", "))
            }
        }
        Outcome::Eligibility {
            student,
            course,
            eligibility,
        } => tone.paint(match eligibility {
            Eligibility::Eligible => {
                format!("✅ Student {student} meets the prerequisites for course {course}")
            }
            Eligibility::Missing(missing) => format!(
                "⚠️  Student {student} does not meet the prerequisites for course {course} \
                 (missing {missing})"
            ),
        }),
        Outcome::Waitlisted(entry) => tone.paint(format!("✅ Waitlisted {entry}")),
        Outcome::Promotion(promotion) => tone.paint(promotion_text(promotion)),
        Outcome::Waitlist(entries) => {
            if entries.is_empty() {
                Tone::Muted.paint("Waitlist is empty")
            } else {
                entries
                    .iter()
                    .enumerate()
                    .map(|(position, entry)| {
                        format!(
                            "{:>2}. student {} → course {}",
                            position + 1,
                            entry.student,
                            entry.course
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        Outcome::IndexReset => tone.paint("⚠️  Course index cleared"),
        Outcome::IndexRebuilt {
            count,
            buckets,
            longest_chain,
            tree_height,
        } => tone.paint(format!(
            "✅ Rebuilt course index ({count} courses, {buckets} buckets, longest chain \
             {longest_chain}, tree height {tree_height})"
        )),
        Outcome::Audit(audit) => audit_text(audit, tone),
    }
}

fn promotion_text(promotion: &DequeueOutcome) -> String {
    match promotion {
        DequeueOutcome::Enrolled { entry } => format!("✅ Enrolled {entry} from the waitlist"),
        DequeueOutcome::Discarded { entry, reason } => {
            let why = match reason {
                DiscardReason::CourseMissing => "course no longer exists",
                DiscardReason::StudentMissing => "student no longer exists",
                DiscardReason::AlreadyEnrolled => "already enrolled",
            };
            format!("⚠️  Removed {entry} from the waitlist: {why}")
        }
        DequeueOutcome::Blocked { entry, reason } => {
            let why = match reason {
                BlockReason::CourseFull { enrolled, max } => {
                    format!("course is still full ({enrolled}/{max})")
                }
                BlockReason::MissingPrerequisite(missing) => {
                    format!("missing prerequisite {missing}")
                }
            };
            format!("⚠️  Waitlist unchanged, {entry} is blocked: {why}")
        }
    }
}

fn field(label: &str, value: &str) -> String {
    format!("  {} {value}", Tone::Muted.paint(format!("{label:<10}")))
}

fn student_card(student: &Student) -> String {
    let mut lines = vec![format!("Student {}: {}", student.id(), student.name)];
    for (label, value) in [
        ("Email", &student.email),
        ("Phone", &student.phone),
        ("Address", &student.address),
    ] {
        if !value.is_empty() {
            lines.push(field(label, value));
        }
    }
    lines.join("\n")
}

fn student_table(students: &[Student]) -> String {
    if students.is_empty() {
        return Tone::Muted.paint("No students registered");
    }
    let mut lines = vec![Tone::Muted.paint(format!("{:<8} {:<24} {}", "ID", "Name", "Email"))];
    lines.extend(
        students
            .iter()
            .map(|s| format!("{:<8} {:<24} {}", s.id(), s.name, s.email)),
    );
    lines.join("\n")
}

fn capacity(course: &Course) -> String {
    match course.max_capacity() {
        0 => format!("{}/∞", course.enrolled()),
        max => format!("{}/{max}", course.enrolled()),
    }
}

fn prerequisite_list(course: &Course) -> String {
    course
        .prerequisites()
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn course_card(course: &Course) -> String {
    let mut lines = vec![format!("Course {}: {}", course.id(), course.name)];
    let fields = [
        ("Credits", course.credit_tier().to_string()),
        ("Instructor", course.instructor.clone()),
        ("Enrolled", capacity(course)),
        ("Requires", prerequisite_list(course)),
    ];
    for (label, value) in fields {
        if !value.is_empty() {
            lines.push(field(label, &value));
        }
    }
    lines.join("\n")
}

fn course_table(courses: &[Course]) -> String {
    if courses.is_empty() {
        return Tone::Muted.paint("No courses in the catalog");
    }
    let mut lines = vec![Tone::Muted.paint(format!(
        "{:<8} {:<24} {:<12} {:<10} {}",
        "ID", "Name", "Credits", "Enrolled", "Requires"
    ))];
    lines.extend(courses.iter().map(|course| {
        format!(
            "{:<8} {:<24} {:<12} {:<10} {}",
            course.id(),
            course.name,
            course.credit_tier().to_string(),
            capacity(course),
            prerequisite_list(course)
        )
    }));
    lines.join("\n")
}

fn audit_text(audit: &Audit, tone: Tone) -> String {
    fn list<T: ToString>(items: &[T]) -> String {
        items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    if audit.is_clean() {
        return tone.paint("✅ No inconsistencies found");
    }

    let mut lines = vec![tone.paint("⚠️  Audit found inconsistencies")];
    if !audit.unindexed_courses.is_empty() {
        lines.push(format!(
            "  Courses missing from the index: {}",
            list(&audit.unindexed_courses)
        ));
    }
    if !audit.stale_index_entries.is_empty() {
        lines.push(format!(
            "  Stale index entries: {}",
            list(&audit.stale_index_entries)
        ));
    }
    for mismatch in &audit.count_mismatches {
        lines.push(format!(
            "  Course {} records {} enrolled but the ledger holds {}",
            mismatch.course, mismatch.recorded, mismatch.ledger
        ));
    }
    if !audit.dangling_enrollments.is_empty() {
        lines.push(format!(
            "  Enrollments with missing records: {}",
            list(&audit.dangling_enrollments)
        ));
    }
    if !audit.dangling_waitlist.is_empty() {
        lines.push(format!(
            "  Waitlist entries with missing records: {}",
            list(&audit.dangling_waitlist)
        ));
    }
    for cycle in &audit.prerequisite_cycles {
        lines.push(format!("  Prerequisite cycle: {}", list(cycle)));
    }
    if !(audit.unindexed_courses.is_empty() && audit.stale_index_entries.is_empty()) {
        lines.push(Tone::Muted.paint("Run 'rebuild-index' to restore the course index."));
    }
    lines.join("\n")
}
