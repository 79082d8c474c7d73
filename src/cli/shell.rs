use std::{num::ParseIntError, str::FromStr};

use clap::Parser;
use dialoguer::{Input, Password, Select, theme::ColorfulTheme};
use registrar::{CourseId, Registrar, Step};
use tracing::instrument;

use super::render;

#[derive(Debug, Default, Parser)]
#[command(about = "Interactive menu over a single in-memory store")]
pub struct Shell {}

impl Shell {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, mut registrar: Registrar) -> anyhow::Result<()> {
        let theme = ColorfulTheme::default();
        let labels: Vec<&str> = Action::ALL.iter().map(|action| action.label()).collect();

        loop {
            let choice = Select::with_theme(&theme)
                .with_prompt("Registrar")
                .items(&labels)
                .default(0)
                .interact()?;

            let Some(step) = Action::ALL
                .get(choice)
                .map(|action| action.prompt(&theme))
                .transpose()?
                .flatten()
            else {
                break;
            };

            let result = step.apply(&mut registrar);
            println!("{}\n", render::text(&result));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    AddStudent,
    EditStudent,
    DeleteStudent,
    FindStudent,
    ListStudents,
    SortStudents,
    AddCourse,
    DropCourse,
    FindCourse,
    ListCourses,
    Enroll,
    Unenroll,
    Enrollments,
    Check,
    Waitlist,
    Promote,
    ShowWaitlist,
    ResetIndex,
    RebuildIndex,
    ProbeIndex,
    Audit,
    Quit,
}

impl Action {
    const ALL: [Self; 22] = [
        Self::AddStudent,
        Self::EditStudent,
        Self::DeleteStudent,
        Self::FindStudent,
        Self::ListStudents,
        Self::SortStudents,
        Self::AddCourse,
        Self::DropCourse,
        Self::FindCourse,
        Self::ListCourses,
        Self::Enroll,
        Self::Unenroll,
        Self::Enrollments,
        Self::Check,
        Self::Waitlist,
        Self::Promote,
        Self::ShowWaitlist,
        Self::ResetIndex,
        Self::RebuildIndex,
        Self::ProbeIndex,
        Self::Audit,
        Self::Quit,
    ];

    const fn label(self) -> &'static str {
        match self {
            Self::AddStudent => "Add student",
            Self::EditStudent => "Edit student",
            Self::DeleteStudent => "Delete student",
            Self::FindStudent => "Find student",
            Self::ListStudents => "List students",
            Self::SortStudents => "Sort students by ID",
            Self::AddCourse => "Add course",
            Self::DropCourse => "Drop course",
            Self::FindCourse => "Find course",
            Self::ListCourses => "List courses",
            Self::Enroll => "Enroll student",
            Self::Unenroll => "Unenroll student",
            Self::Enrollments => "Show a student's enrollments",
            Self::Check => "Check prerequisites",
            Self::Waitlist => "Add to waitlist",
            Self::Promote => "Promote from waitlist",
            Self::ShowWaitlist => "Show waitlist",
            Self::ResetIndex => "Clear course index",
            Self::RebuildIndex => "Rebuild course index",
            Self::ProbeIndex => "Look up course in index only",
            Self::Audit => "Audit",
            Self::Quit => "Quit",
        }
    }

    /// Asks for the action's arguments. `None` means quit.
    fn prompt(self, theme: &ColorfulTheme) -> dialoguer::Result<Option<Step>> {
        let step = match self {
            Self::AddStudent => Step::AddStudent {
                id: ask(theme, "Student ID")?,
                name: text(theme, "Name", false)?,
                email: text(theme, "Email", true)?,
                phone: text(theme, "Phone", true)?,
                address: text(theme, "Address", true)?,
                password: Password::with_theme(theme)
                    .with_prompt("Password")
                    .allow_empty_password(true)
                    .interact()?
                    .into(),
            },
            Self::EditStudent => Step::EditStudent {
                id: ask(theme, "Student ID")?,
                name: optional(theme, "New name (blank to keep)")?,
                email: optional(theme, "New email (blank to keep)")?,
                phone: optional(theme, "New phone (blank to keep)")?,
                address: optional(theme, "New address (blank to keep)")?,
                password: None,
            },
            Self::DeleteStudent => Step::DeleteStudent {
                id: ask(theme, "Student ID")?,
            },
            Self::FindStudent => Step::FindStudent {
                id: ask(theme, "Student ID")?,
            },
            Self::ListStudents => Step::ListStudents,
            Self::SortStudents => Step::SortStudents,
            Self::AddCourse => Step::AddCourse {
                id: ask(theme, "Course ID")?,
                name: text(theme, "Name", false)?,
                credits: ask(theme, "Credits")?,
                instructor: text(theme, "Instructor", true)?,
                max_capacity: ask(theme, "Max capacity (0 for unlimited)")?,
                prerequisites: Input::<String>::with_theme(theme)
                    .with_prompt("Prerequisites (comma separated)")
                    .allow_empty(true)
                    .validate_with(|input: &String| {
                        parse_prerequisites(input).map(|_| ()).map_err(|e| e.to_string())
                    })
                    .interact_text()
                    .map(|input| parse_prerequisites(&input).unwrap_or_default())?,
            },
            Self::DropCourse => Step::DropCourse {
                id: ask(theme, "Course ID")?,
            },
            Self::FindCourse => Step::FindCourse {
                id: ask(theme, "Course ID")?,
            },
            Self::ListCourses => Step::ListCourses,
            Self::Enroll => Step::Enroll {
                student: ask(theme, "Student ID")?,
                course: ask(theme, "Course ID")?,
            },
            Self::Unenroll => Step::Unenroll {
                student: ask(theme, "Student ID")?,
                course: ask(theme, "Course ID")?,
            },
            Self::Enrollments => Step::Enrollments {
                student: ask(theme, "Student ID")?,
            },
            Self::Check => Step::Check {
                student: ask(theme, "Student ID")?,
                course: ask(theme, "Course ID")?,
            },
            Self::Waitlist => Step::Waitlist {
                student: ask(theme, "Student ID")?,
                course: ask(theme, "Course ID")?,
            },
            Self::Promote => Step::Promote,
            Self::ShowWaitlist => Step::ShowWaitlist,
            Self::ResetIndex => Step::ResetIndex,
            Self::RebuildIndex => Step::RebuildIndex,
            Self::ProbeIndex => Step::ProbeIndex {
                id: ask(theme, "Course ID")?,
            },
            Self::Audit => Step::Audit,
            Self::Quit => return Ok(None),
        };
        Ok(Some(step))
    }
}

fn ask<T>(theme: &ColorfulTheme, prompt: &str) -> dialoguer::Result<T>
where
    T: Clone + ToString + FromStr,
    T::Err: ToString,
{
    Input::with_theme(theme).with_prompt(prompt).interact_text()
}

fn text(theme: &ColorfulTheme, prompt: &str, allow_empty: bool) -> dialoguer::Result<String> {
    Input::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(allow_empty)
        .interact_text()
}

fn optional(theme: &ColorfulTheme, prompt: &str) -> dialoguer::Result<Option<String>> {
    let value = text(theme, prompt, true)?;
    Ok((!value.trim().is_empty()).then_some(value))
}

fn parse_prerequisites(input: &str) -> Result<Vec<CourseId>, ParseIntError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::parse)
        .collect()
}
