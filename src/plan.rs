use crate::assign::Assignment;
use crate::calendar::{date_key, RemainingByDate};
use crate::form::TodoDraft;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::{format_description::FormatItem, macros::format_description, Date, Duration};

pub(crate) static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum Subject {
    #[default]
    Korean,
    English,
    Math,
}

impl Subject {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Subject::Korean => "국어",
            Subject::English => "영어",
            Subject::Math => "수학",
        }
    }

    pub(crate) fn next(self) -> Subject {
        match self {
            Subject::Korean => Subject::English,
            Subject::English => Subject::Math,
            Subject::Math => Subject::Korean,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Todo {
    pub(crate) date: Date,
    pub(crate) name: String,
    pub(crate) goal_minutes: u32,
    pub(crate) done: bool,
    pub(crate) subject: Option<Subject>,
    /// Paths of the images attached as proof of study
    pub(crate) proofs: Vec<PathBuf>,
}

impl Todo {
    pub(crate) fn new(date: Date, name: &str, goal_minutes: u32) -> Todo {
        Todo {
            date,
            name: String::from(name),
            goal_minutes,
            done: false,
            subject: None,
            proofs: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
struct PlanFile {
    todos: Vec<RawTodo>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
struct RawTodo {
    date: String,
    name: String,
    #[serde(alias = "goal_minutes")]
    goal_minutes: u32,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    subject: Option<Subject>,
    #[serde(default)]
    proofs: Vec<PathBuf>,
}

impl TryFrom<RawTodo> for Todo {
    type Error = PlanError;

    fn try_from(raw: RawTodo) -> Result<Todo, PlanError> {
        let date = Date::parse(&raw.date, &YMD_FMT).map_err(|source| PlanError::BadDate {
            date: raw.date.clone(),
            source,
        })?;
        Ok(Todo {
            date,
            name: raw.name,
            goal_minutes: raw.goal_minutes,
            done: raw.done,
            subject: raw.subject,
            proofs: raw.proofs,
        })
    }
}

/// A mentee's to-dos.  Every change bumps the revision so that views derived
/// from the plan know to rebuild.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct StudyPlan {
    todos: Vec<Todo>,
    revision: u64,
}

impl StudyPlan {
    pub(crate) fn new(todos: Vec<Todo>) -> StudyPlan {
        StudyPlan { todos, revision: 0 }
    }

    pub(crate) fn load(path: &Path) -> Result<StudyPlan, PlanError> {
        let src = fs::read_to_string(path).map_err(|source| PlanError::Read {
            path: path.to_owned(),
            source,
        })?;
        let plan = StudyPlan::from_json(&src)?;
        tracing::info!(path = %path.display(), todos = plan.todos.len(), "loaded study plan");
        Ok(plan)
    }

    pub(crate) fn from_json(src: &str) -> Result<StudyPlan, PlanError> {
        let file = serde_json::from_str::<PlanFile>(src)?;
        let todos = file
            .todos
            .into_iter()
            .map(Todo::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(StudyPlan::new(todos))
    }

    /// A plan spread over the days around `today`, for running without a
    /// plan file
    pub(crate) fn demo(today: Date) -> StudyPlan {
        let todos = [
            (-3, "평가원모의고사 풀이", Subject::Korean, 90, true),
            (-1, "영단어 10개 외우기", Subject::English, 30, true),
            (-1, "작품 분석 2편", Subject::Korean, 40, false),
            (0, "영단어 10개 외우기", Subject::English, 30, false),
            (0, "RPM 3단원 오답노트", Subject::Math, 60, false),
            (0, "시대인재 국어", Subject::Korean, 50, true),
            (1, "9월 모의고사 오답노트", Subject::Math, 45, false),
            (3, "영단어 10개 외우기", Subject::English, 30, false),
            (6, "평가원모의고사 풀이", Subject::Korean, 90, false),
        ]
        .into_iter()
        .filter_map(|(days, name, subject, goal_minutes, done)| {
            let mut todo = Todo::new(today.checked_add(Duration::days(days))?, name, goal_minutes);
            todo.subject = Some(subject);
            todo.done = done;
            Some(todo)
        })
        .collect();
        StudyPlan::new(todos)
    }

    pub(crate) fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of unfinished to-dos per `YYYY-MM-DD` day key; days with none
    /// are absent
    pub(crate) fn remaining_by_date(&self) -> RemainingByDate {
        let mut remaining = RemainingByDate::new();
        for todo in self.todos.iter().filter(|t| !t.done) {
            *remaining.entry(date_key(todo.date)).or_insert(0) += 1;
        }
        remaining
    }

    /// Returns the to-dos on `date` along with their indices in the plan
    pub(crate) fn todos_on(&self, date: Date) -> Vec<(usize, &Todo)> {
        self.todos
            .iter()
            .enumerate()
            .filter(|(_, t)| t.date == date)
            .collect()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Todo> {
        self.todos.get(index)
    }

    pub(crate) fn add(&mut self, date: Date, draft: TodoDraft) -> usize {
        tracing::info!(%date, name = %draft.name, "added to-do");
        self.todos.push(Todo::new(date, &draft.name, draft.goal_minutes));
        self.revision += 1;
        self.todos.len() - 1
    }

    /// Adds one to-do for each day the assignment covers and returns how many
    /// were added
    pub(crate) fn assign(&mut self, assignment: &Assignment) -> usize {
        let mut added = 0;
        for date in assignment.dates.days() {
            let mut todo = Todo::new(date, &assignment.name, assignment.goal_minutes);
            todo.subject = Some(assignment.subject);
            self.todos.push(todo);
            added += 1;
        }
        if added > 0 {
            self.revision += 1;
        }
        tracing::info!(
            subject = assignment.subject.label(),
            name = %assignment.name,
            added,
            "assigned to-do"
        );
        added
    }

    /// Replaces the name and goal of the to-do at `index`.  Returns `false`
    /// if there is no such to-do.
    pub(crate) fn update(&mut self, index: usize, draft: TodoDraft) -> bool {
        let Some(todo) = self.todos.get_mut(index) else {
            return false;
        };
        tracing::info!(date = %todo.date, name = %draft.name, "edited to-do");
        todo.name = draft.name;
        todo.goal_minutes = draft.goal_minutes;
        self.revision += 1;
        true
    }

    /// Replaces the proof images of the to-do at `index`.  Returns `false` if
    /// there is no such to-do.
    pub(crate) fn set_proofs(&mut self, index: usize, proofs: Vec<PathBuf>) -> bool {
        let Some(todo) = self.todos.get_mut(index) else {
            return false;
        };
        tracing::info!(date = %todo.date, name = %todo.name, count = proofs.len(), "saved proof images");
        todo.proofs = proofs;
        self.revision += 1;
        true
    }

    /// Flips the done flag of the to-do at `index`, returning the new value
    pub(crate) fn toggle_done(&mut self, index: usize) -> Option<bool> {
        let todo = self.todos.get_mut(index)?;
        todo.done = !todo.done;
        self.revision += 1;
        Some(todo.done)
    }
}

#[derive(Debug, Error)]
pub(crate) enum PlanError {
    #[error("failed to read plan file {}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse plan file")]
    Parse(#[from] serde_json::Error),
    #[error("invalid to-do date {date:?}")]
    BadDate {
        date: String,
        source: time::error::Parse,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::AssignDates;
    use time::macros::date;

    static PLAN: &str = r#"{
        "todos": [
            {"date": "2026-02-05", "name": "영단어 10개 외우기", "goalMinutes": 30},
            {"date": "2026-02-05", "name": "RPM 3단원 오답노트", "goalMinutes": 60, "done": true,
             "subject": "MATH", "proofs": ["/tmp/rpm-1.jpg"]},
            {"date": "2026-02-05", "name": "작품 분석 2편", "goal_minutes": 40},
            {"date": "2026-02-07", "name": "시대인재 국어", "goalMinutes": 50}
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let plan = StudyPlan::from_json(PLAN).unwrap();
        assert_eq!(plan.todos.len(), 4);
        assert_eq!(
            plan.get(2),
            Some(&Todo::new(date!(2026 - 02 - 05), "작품 분석 2편", 40))
        );
        let rpm = plan.get(1).unwrap();
        assert_eq!(rpm.subject, Some(Subject::Math));
        assert_eq!(rpm.proofs, [PathBuf::from("/tmp/rpm-1.jpg")]);
    }

    #[test]
    fn test_bad_subject() {
        let r = StudyPlan::from_json(
            r#"{"todos": [{"date": "2026-02-03", "name": "x", "goalMinutes": 1, "subject": "ART"}]}"#,
        );
        assert!(matches!(r, Err(PlanError::Parse(_))));
    }

    #[test]
    fn test_set_proofs() {
        let mut plan = StudyPlan::from_json(PLAN).unwrap();
        let proofs = vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")];
        assert!(plan.set_proofs(0, proofs.clone()));
        assert_eq!(plan.get(0).map(|t| &t.proofs), Some(&proofs));
        assert_eq!(plan.revision(), 1);
        assert!(!plan.set_proofs(99, Vec::new()));
        assert_eq!(plan.revision(), 1);
    }

    #[test]
    fn test_assign_period_adds_one_per_day() {
        let mut plan = StudyPlan::default();
        let added = plan.assign(&Assignment {
            subject: Subject::Math,
            dates: AssignDates::Period {
                start: date!(2026 - 02 - 27),
                end: date!(2026 - 03 - 02),
            },
            name: String::from("RPM"),
            goal_minutes: 60,
        });
        assert_eq!(added, 4);
        assert_eq!(plan.revision(), 1);
        let todo = plan.todos_on(date!(2026 - 03 - 01))[0].1;
        assert_eq!(todo.subject, Some(Subject::Math));
        assert_eq!(todo.name, "RPM");
        assert!(!todo.done);
        assert_eq!(plan.remaining_by_date().get("2026-02-28"), Some(&1));
        let added = plan.assign(&Assignment {
            subject: Subject::Korean,
            dates: AssignDates::Single(date!(2026 - 03 - 01)),
            name: String::from("문학"),
            goal_minutes: 30,
        });
        assert_eq!(added, 1);
        assert_eq!(plan.revision(), 2);
        assert_eq!(plan.todos_on(date!(2026 - 03 - 01)).len(), 2);
    }

    #[test]
    fn test_remaining_by_date_skips_done() {
        let plan = StudyPlan::from_json(PLAN).unwrap();
        let remaining = plan.remaining_by_date();
        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining.get("2026-02-05"), Some(&2));
        assert_eq!(remaining.get("2026-02-07"), Some(&1));
        assert_eq!(remaining.get("2026-02-06"), None);
    }

    #[test]
    fn test_bad_date() {
        let r = StudyPlan::from_json(
            r#"{"todos": [{"date": "2026-02-30", "name": "x", "goalMinutes": 1}]}"#,
        );
        assert!(matches!(r, Err(PlanError::BadDate { ref date, .. }) if date == "2026-02-30"));
    }

    #[test]
    fn test_bad_json() {
        let r = StudyPlan::from_json(r#"{"todos": [{"date": "2026-02-03"}]}"#);
        assert!(matches!(r, Err(PlanError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let r = StudyPlan::load(Path::new("/nonexistent/plan.json"));
        assert!(matches!(r, Err(PlanError::Read { .. })));
    }

    #[test]
    fn test_edits_bump_revision() {
        let mut plan = StudyPlan::from_json(PLAN).unwrap();
        assert_eq!(plan.revision(), 0);
        assert_eq!(plan.toggle_done(0), Some(true));
        assert_eq!(plan.revision(), 1);
        assert_eq!(plan.remaining_by_date().get("2026-02-05"), Some(&1));
        let i = plan.add(
            date!(2026 - 02 - 06),
            TodoDraft {
                name: String::from("수학 기출"),
                goal_minutes: 25,
            },
        );
        assert_eq!(i, 4);
        assert_eq!(plan.revision(), 2);
        assert!(plan.update(
            i,
            TodoDraft {
                name: String::from("수학 기출 2회"),
                goal_minutes: 35,
            }
        ));
        assert_eq!(plan.get(i).map(|t| t.goal_minutes), Some(35));
        assert!(!plan.update(
            99,
            TodoDraft {
                name: String::from("x"),
                goal_minutes: 1,
            }
        ));
        assert_eq!(plan.toggle_done(99), None);
        assert_eq!(plan.revision(), 3);
    }

    #[test]
    fn test_todos_on() {
        let plan = StudyPlan::from_json(PLAN).unwrap();
        let day = plan.todos_on(date!(2026 - 02 - 07));
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].0, 3);
        assert!(plan.todos_on(date!(2026 - 02 - 08)).is_empty());
    }

    #[test]
    fn test_demo_is_centered_on_today() {
        let plan = StudyPlan::demo(date!(2026 - 02 - 05));
        assert_eq!(plan.todos_on(date!(2026 - 02 - 05)).len(), 3);
        assert_eq!(plan.remaining_by_date().get("2026-02-05"), Some(&2));
    }
}
