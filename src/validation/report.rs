//! Structured validation results

use std::fmt;

/// The checks a trajectory goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    Preconditions,
    InitialState,
    StepSize,
    Collision,
    PushValidity,
    GoalCount,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Check::Preconditions => "preconditions",
            Check::InitialState => "initial state",
            Check::StepSize => "step size",
            Check::Collision => "collision",
            Check::PushValidity => "pushed objects",
            Check::GoalCount => "goal count",
        };
        write!(f, "{}", name)
    }
}

/// What went wrong in a failed check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Malformed,
    InitialStateMismatch,
    StepTooLong,
    Collision,
    OutsideArena,
    GapSliding,
    MultipleObjectsMoved,
    NotInPushingPosition,
    NotMovingWithRobot,
    WrongDirection,
}

/// One line of the report. Passing checks get a single entry with no
/// step and no failure kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub check: Check,
    pub step: Option<usize>,
    pub failure: Option<FailureKind>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub passed: bool,
    pub diagnostics: Vec<Diagnostic>,
    /// Final boxes sitting on their goal
    pub goals_reached: usize,
    pub goal_total: usize,
}

impl ValidationReport {
    pub fn new(goal_total: usize) -> Self {
        Self {
            passed: true,
            diagnostics: Vec::new(),
            goals_reached: 0,
            goal_total,
        }
    }

    pub(crate) fn pass(&mut self, check: Check) {
        log::info!("{}: passed", check);
        self.diagnostics.push(Diagnostic {
            check,
            step: None,
            failure: None,
            message: "passed".to_string(),
        });
    }

    pub(crate) fn fail(
        &mut self,
        check: Check,
        step: Option<usize>,
        failure: FailureKind,
        message: String,
    ) {
        log::warn!("{}: {}", check, message);
        self.passed = false;
        self.diagnostics.push(Diagnostic {
            check,
            step,
            failure: Some(failure),
            message,
        });
    }

    pub(crate) fn note(&mut self, check: Check, message: String) {
        log::info!("{}: {}", check, message);
        self.diagnostics.push(Diagnostic {
            check,
            step: None,
            failure: None,
            message,
        });
    }

    pub fn failures(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.diagnostics.iter().filter(|d| d.failure.is_some())
    }

    pub fn failures_of(&self, check: Check) -> Vec<&Diagnostic> {
        self.failures().filter(|d| d.check == check).collect()
    }

    /// Whether `check` ran and recorded no failure
    pub fn check_passed(&self, check: Check) -> bool {
        let ran = self.diagnostics.iter().any(|d| d.check == check);
        ran && self.failures_of(check).is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.diagnostics {
            match d.step {
                Some(step) => writeln!(f, "[{}] step {}: {}", d.check, step, d.message)?,
                None => writeln!(f, "[{}] {}", d.check, d.message)?,
            }
        }
        write!(
            f,
            "{}; {} out of {} goals reached",
            if self.passed { "PASSED" } else { "FAILED" },
            self.goals_reached,
            self.goal_total
        )
    }
}
