//! The student registry.
//!
//! The [`StudentDirectory`] is a singly linked list of students kept in
//! insertion order. Every lookup is a linear scan from the head.

use tracing::instrument;

use crate::domain::{Error, Student, StudentId, StudentUpdate};

struct StudentNode {
    student: Student,
    next: Option<Box<StudentNode>>,
}

/// A singly linked list of students with unique IDs.
#[derive(Default)]
pub struct StudentDirectory {
    head: Option<Box<StudentNode>>,
    len: usize,
}

impl StudentDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// Appends a student at the end of the list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateStudent`] if the ID is taken, in which case the
    /// directory is untouched.
    #[instrument(skip(self, student), fields(id = %student.id()))]
    pub fn insert(&mut self, student: Student) -> Result<(), Error> {
        if self.contains(student.id()) {
            return Err(Error::DuplicateStudent(student.id()));
        }

        if let Some(tail) = self.tail_link() {
            *tail = Some(Box::new(StudentNode {
                student,
                next: None,
            }));
            self.len += 1;
        }

        tracing::debug!("student added");
        Ok(())
    }

    /// Unlinks and returns the student with the given ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStudent`] if no student has this ID.
    #[instrument(skip(self))]
    pub fn delete(&mut self, id: StudentId) -> Result<Student, Error> {
        let student = self.unlink(id).ok_or(Error::UnknownStudent(id))?;
        self.len -= 1;
        tracing::debug!("student removed");
        Ok(student)
    }

    /// Finds a student by ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStudent`] if no student has this ID.
    pub fn find(&self, id: StudentId) -> Result<&Student, Error> {
        self.iter()
            .find(|student| student.id() == id)
            .ok_or(Error::UnknownStudent(id))
    }

    /// Applies field edits to a student and returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStudent`] if no student has this ID.
    pub fn update(&mut self, id: StudentId, update: StudentUpdate) -> Result<&Student, Error> {
        let student = self
            .iter_mut()
            .find(|student| student.id() == id)
            .ok_or(Error::UnknownStudent(id))?;
        student.apply(update);
        Ok(student)
    }

    /// Returns `true` if a student with this ID is registered.
    #[must_use]
    pub fn contains(&self, id: StudentId) -> bool {
        self.iter().any(|student| student.id() == id)
    }

    /// Iterates students in list order.
    ///
    /// This is insertion order until [`StudentDirectory::sort_by_id`] is called.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    fn iter_mut(&mut self) -> IterMut<'_> {
        IterMut {
            next: self.head.as_deref_mut(),
        }
    }

    /// Number of registered students.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no students are registered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sorts the list by ascending ID.
    ///
    /// This is a bubble sort: adjacent records are swapped in repeated passes
    /// until a pass makes no swap. It is quadratic in the number of students
    /// and stable. Returns the number of passes made.
    #[instrument(skip(self), fields(len = self.len))]
    pub fn sort_by_id(&mut self) -> usize {
        let mut passes = 0;
        loop {
            passes += 1;
            let mut swapped = false;
            let mut cursor = self.head.as_deref_mut();
            while let Some(node) = cursor {
                if let Some(next) = node.next.as_deref_mut() {
                    if node.student.id() > next.student.id() {
                        std::mem::swap(&mut node.student, &mut next.student);
                        swapped = true;
                    }
                }
                cursor = node.next.as_deref_mut();
            }
            if !swapped {
                break;
            }
        }
        tracing::debug!(passes, "students sorted");
        passes
    }

    /// The empty link at the end of the list.
    fn tail_link(&mut self) -> Option<&mut Option<Box<StudentNode>>> {
        let mut cursor = &mut self.head;
        while cursor.is_some() {
            cursor = &mut cursor.as_mut()?.next;
        }
        Some(cursor)
    }

    fn unlink(&mut self, id: StudentId) -> Option<Student> {
        let mut cursor = &mut self.head;
        while cursor
            .as_ref()
            .is_some_and(|node| node.student.id() != id)
        {
            cursor = &mut cursor.as_mut()?.next;
        }
        let node = cursor.take()?;
        let StudentNode { student, next } = *node;
        *cursor = next;
        Some(student)
    }
}

impl Drop for StudentDirectory {
    // Unlink iteratively so long lists don't overflow the stack.
    fn drop(&mut self) {
        let mut next = self.head.take();
        while let Some(mut node) = next {
            next = node.next.take();
        }
    }
}

impl std::fmt::Debug for StudentDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a StudentDirectory {
    type Item = &'a Student;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the students in a [`StudentDirectory`].
#[derive(Debug)]
pub struct Iter<'a> {
    next: Option<&'a StudentNode>,
}

impl std::fmt::Debug for StudentNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.student.fmt(f)
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Student;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            &node.student
        })
    }
}

struct IterMut<'a> {
    next: Option<&'a mut StudentNode>,
}

impl<'a> Iterator for IterMut<'a> {
    type Item = &'a mut Student;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.take().map(|node| {
            self.next = node.next.as_deref_mut();
            &mut node.student
        })
    }
}
