//! Read-only consistency report over a [`Registrar`].

use petgraph::{algo::tarjan_scc, graphmap::DiGraphMap};
use serde::Serialize;

use crate::{
    Registrar,
    domain::{Course, CourseId, Enrollment, WaitlistEntry},
};

/// A course whose enrolled count disagrees with the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountMismatch {
    /// The course.
    pub course: CourseId,
    /// The count stored on the course.
    pub recorded: u32,
    /// The number of ledger entries for the course.
    pub ledger: usize,
}

/// Everything an audit found. An empty report means the store is consistent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Audit {
    /// Courses in the tree that the index cannot resolve.
    pub unindexed_courses: Vec<CourseId>,
    /// Index entries pointing at a missing or different course.
    pub stale_index_entries: Vec<CourseId>,
    /// Courses whose enrolled count is wrong.
    pub count_mismatches: Vec<CountMismatch>,
    /// Enrollments naming a student or course that no longer exists.
    pub dangling_enrollments: Vec<Enrollment>,
    /// Waitlist entries naming a student or course that no longer exists.
    pub dangling_waitlist: Vec<WaitlistEntry>,
    /// Groups of courses that require each other, each sorted by ID.
    pub prerequisite_cycles: Vec<Vec<CourseId>>,
}

impl Audit {
    pub(super) fn of(registrar: &Registrar) -> Self {
        let catalog = registrar.catalog();
        let students = registrar.students();
        let ledger = registrar.ledger();

        let count_mismatches = catalog
            .iter()
            .filter_map(|course| {
                let entries = ledger.count_for(course.id());
                (usize::try_from(course.enrolled()) != Ok(entries)).then(|| CountMismatch {
                    course: course.id(),
                    recorded: course.enrolled(),
                    ledger: entries,
                })
            })
            .collect();

        let dangling_enrollments = ledger
            .iter()
            .filter(|e| !students.contains(e.student) || !catalog.contains(e.course))
            .copied()
            .collect();

        let dangling_waitlist = registrar
            .waitlist()
            .filter(|e| !students.contains(e.student) || !catalog.contains(e.course))
            .collect();

        let audit = Self {
            unindexed_courses: catalog.unindexed(),
            stale_index_entries: catalog.stale_index_entries(),
            count_mismatches,
            dangling_enrollments,
            dangling_waitlist,
            prerequisite_cycles: prerequisite_cycles(catalog.iter()),
        };

        if !audit.is_clean() {
            tracing::warn!(?audit, "audit found inconsistencies");
        }
        audit
    }

    /// Returns `true` if nothing was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unindexed_courses.is_empty()
            && self.stale_index_entries.is_empty()
            && self.count_mismatches.is_empty()
            && self.dangling_enrollments.is_empty()
            && self.dangling_waitlist.is_empty()
            && self.prerequisite_cycles.is_empty()
    }
}

/// Strongly connected components of the "requires" graph that contain a
/// cycle, including courses that list themselves.
fn prerequisite_cycles<'a>(courses: impl Iterator<Item = &'a Course>) -> Vec<Vec<CourseId>> {
    let mut graph = DiGraphMap::<CourseId, ()>::new();
    for course in courses {
        graph.add_node(course.id());
        for prerequisite in course.prerequisites().iter() {
            graph.add_edge(course.id(), prerequisite, ());
        }
    }

    let mut cycles: Vec<Vec<CourseId>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| match component.as_slice() {
            [single] => graph.contains_edge(*single, *single),
            _ => true,
        })
        .map(|mut component| {
            component.sort();
            component
        })
        .collect();
    cycles.sort();
    cycles
}
