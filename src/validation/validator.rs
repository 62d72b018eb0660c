//! Trajectory validator
//!
//! Checks a complete robot trajectory against the pushing model. Every
//! check scans the whole trajectory on its own and records diagnostics
//! without stopping the others; the trajectory passes when all of them do.

use nalgebra::Vector2;

use crate::common::{MovableBox, Point2D, Problem, PushError, PushResult, RobotConfig};
use crate::geometry::{
    contains_point, contains_rect, inflate, intersects, segment_intersects_rect, Axis, ARENA,
};
use crate::planning::configuration::Slot;
use crate::validation::coupling::{
    aligned_footprint, angle_tolerance, coupling, OverlapRule, PushDirection,
};
use crate::validation::report::{Check, FailureKind, ValidationReport};
use crate::validation::trajectory::{Trajectory, TrajectoryStep};

/// Configuration for the trajectory validator
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Maximum endpoint displacement between two steps
    pub max_step: f64,
    /// Slack allowed on every geometric comparison
    pub tolerance: f64,
    /// Side overlap, as a fraction of robot width, when the footprint starts at the box edge
    pub low_side_overlap: f64,
    /// Side overlap when the footprint starts inside the box side
    pub high_side_overlap: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_step: 0.001,
            tolerance: 0.0001,
            low_side_overlap: 0.75,
            high_side_overlap: 0.85,
        }
    }
}

/// Which objects changed position between two steps
enum Moved {
    Nothing,
    One(Slot),
    Several,
}

pub struct SolutionValidator<'a> {
    problem: &'a Problem,
    config: ValidatorConfig,
    angle_tolerance: f64,
}

impl<'a> SolutionValidator<'a> {
    pub fn new(problem: &'a Problem, config: ValidatorConfig) -> PushResult<Self> {
        if !(config.tolerance >= 0.0) || config.tolerance > problem.robot_width() {
            return Err(PushError::InvalidParameter(format!(
                "tolerance {} must be in [0, robot width {}]",
                config.tolerance,
                problem.robot_width()
            )));
        }
        if !(config.max_step > 0.0) {
            return Err(PushError::InvalidParameter(format!(
                "maximum step {} must be positive",
                config.max_step
            )));
        }
        let angle_tolerance = angle_tolerance(config.tolerance, problem.robot_width());
        Ok(Self {
            problem,
            config,
            angle_tolerance,
        })
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Run every check and collect the report.
    pub fn validate(&self, trajectory: &Trajectory) -> ValidationReport {
        let mut report = ValidationReport::new(self.problem.boxes().len());

        if trajectory.is_empty() {
            report.fail(
                Check::Preconditions,
                None,
                FailureKind::Malformed,
                "trajectory has no steps".to_string(),
            );
            return report;
        }

        let well_formed = match self.malformed_step(trajectory) {
            Some(i) => {
                let step = &trajectory.steps()[i];
                report.fail(
                    Check::Preconditions,
                    Some(i),
                    FailureKind::Malformed,
                    format!(
                        "step {} has {} boxes and {} obstacles, expected {} and {}",
                        i,
                        step.boxes.len(),
                        step.obstacles.len(),
                        self.problem.boxes().len(),
                        self.problem.obstacles().len()
                    ),
                );
                false
            }
            None => true,
        };

        if well_formed {
            self.check_initial_state(trajectory, &mut report);
        }
        self.check_step_size(trajectory, &mut report);
        if well_formed {
            self.check_collision(trajectory, &mut report);
            self.check_push_validity(trajectory, &mut report);

            report.goals_reached = self.count_goals(trajectory);
            let message = format!(
                "{} out of {} goals reached",
                report.goals_reached, report.goal_total
            );
            report.note(Check::GoalCount, message);
        }

        report
    }

    fn malformed_step(&self, trajectory: &Trajectory) -> Option<usize> {
        trajectory.steps().iter().position(|step| {
            step.boxes.len() != self.problem.boxes().len()
                || step.obstacles.len() != self.problem.obstacles().len()
        })
    }

    /// Step 0 must be the problem's initial state.
    pub fn check_initial_state(&self, trajectory: &Trajectory, report: &mut ValidationReport) -> bool {
        let first = match trajectory.steps().first() {
            Some(step) => step,
            None => return false,
        };

        let same_positions = |actual: &[MovableBox], expected: &[MovableBox]| {
            actual.len() == expected.len()
                && actual
                    .iter()
                    .zip(expected.iter())
                    .all(|(a, e)| a.position == e.position)
        };
        let matches = first.robot == self.problem.initial_robot()
            && same_positions(&first.boxes, self.problem.boxes())
            && same_positions(&first.obstacles, self.problem.obstacles());

        if matches {
            report.pass(Check::InitialState);
        } else {
            report.fail(
                Check::InitialState,
                Some(0),
                FailureKind::InitialStateMismatch,
                "solution path must start at initial state".to_string(),
            );
        }
        matches
    }

    /// Both footprint endpoints move at most one primitive step at a time.
    pub fn check_step_size(&self, trajectory: &Trajectory, report: &mut ValidationReport) -> bool {
        let mut pass = true;
        for (i, pair) in trajectory.steps().windows(2).enumerate() {
            if !self.is_valid_step(&pair[0].robot, &pair[1].robot) {
                report.fail(
                    Check::StepSize,
                    Some(i + 1),
                    FailureKind::StepTooLong,
                    format!("step size over {} at step {}", self.config.max_step, i + 1),
                );
                pass = false;
            }
        }
        if pass {
            report.pass(Check::StepSize);
        }
        pass
    }

    pub fn is_valid_step(&self, from: &RobotConfig, to: &RobotConfig) -> bool {
        let width = self.problem.robot_width();
        let limit = self.config.max_step + self.config.tolerance;
        let (a1, a2) = from.endpoints(width);
        let (b1, b2) = to.endpoints(width);
        a1.distance(&b1) <= limit && a2.distance(&b2) <= limit
    }

    /// No interpenetration, everything inside the arena, no gap sliding.
    pub fn check_collision(&self, trajectory: &Trajectory, report: &mut ValidationReport) -> bool {
        let mut pass = true;
        for (i, step) in trajectory.steps().iter().enumerate() {
            if let Some((kind, reason)) = self.find_collision(step) {
                report.fail(
                    Check::Collision,
                    Some(i),
                    kind,
                    format!("collision at step {}: {}", i, reason),
                );
                pass = false;
            }
            if self.is_gap_sliding(step) {
                report.fail(
                    Check::Collision,
                    Some(i),
                    FailureKind::GapSliding,
                    format!("collision at step {}: robot slides between two objects", i),
                );
                pass = false;
            }
        }
        if pass {
            report.pass(Check::Collision);
        }
        pass
    }

    fn find_collision(&self, step: &TrajectoryStep) -> Option<(FailureKind, String)> {
        let tol = self.config.tolerance;
        let statics = self.problem.static_obstacles();
        let (p1, p2) = step.robot.endpoints(self.problem.robot_width());

        for (k, obstacle) in statics.iter().enumerate() {
            if segment_intersects_rect(&p1, &p2, &inflate(&obstacle.rect, -tol)) {
                return Some((FailureKind::Collision, format!("robot hits static obstacle {}", k)));
            }
        }
        if !contains_point(&ARENA, &p1) || !contains_point(&ARENA, &p2) {
            return Some((FailureKind::OutsideArena, "robot outside the arena".to_string()));
        }

        let objects: Vec<(Slot, &MovableBox)> = step.objects().collect();
        for (i, (slot, b)) in objects.iter().enumerate() {
            if !contains_rect(&ARENA, &b.rect()) {
                return Some((FailureKind::OutsideArena, format!("{:?} outside the arena", slot)));
            }

            let shrunk = inflate(&b.rect(), -tol);
            if segment_intersects_rect(&p1, &p2, &shrunk) {
                return Some((FailureKind::Collision, format!("robot overlaps {:?}", slot)));
            }
            let hit = objects
                .iter()
                .enumerate()
                .find(|(j, (_, other))| *j != i && intersects(&shrunk, &other.rect()));
            if let Some((_, (other, _))) = hit {
                return Some((FailureKind::Collision, format!("{:?} overlaps {:?}", slot, other)));
            }
            if let Some(k) = statics.iter().position(|o| intersects(&shrunk, &o.rect)) {
                return Some((
                    FailureKind::Collision,
                    format!("{:?} overlaps static obstacle {}", slot, k),
                ));
            }
        }
        None
    }

    /// The robot, shortened by the tolerance at both ends, touches more than
    /// one object: it is squeezing through a gap between them.
    fn is_gap_sliding(&self, step: &TrajectoryStep) -> bool {
        let tol = self.config.tolerance;
        let footprint =
            match aligned_footprint(&step.robot, self.problem.robot_width(), self.angle_tolerance) {
                Some(footprint) => footprint,
                None => return false,
            };
        let inset = match footprint.axis {
            Axis::X => Vector2::new(tol, 0.0),
            Axis::Y => Vector2::new(0.0, tol),
        };
        let r1 = Point2D::from(footprint.low.to_vector() + inset);
        let r2 = Point2D::from(footprint.high.to_vector() - inset);

        step.objects()
            .filter(|(_, b)| segment_intersects_rect(&r1, &r2, &inflate(&b.rect(), tol)))
            .count()
            > 1
    }

    /// At most one object moves per step, and only when pushed.
    pub fn check_push_validity(&self, trajectory: &Trajectory, report: &mut ValidationReport) -> bool {
        let mut pass = true;
        for (index, pair) in trajectory.steps().windows(2).enumerate() {
            let i = index + 1;
            let (old, new) = (&pair[0], &pair[1]);

            let slot = match self.moved_objects(old, new) {
                Moved::Nothing => continue,
                Moved::Several => {
                    report.fail(
                        Check::PushValidity,
                        Some(i),
                        FailureKind::MultipleObjectsMoved,
                        format!("multiple movable object moved at step {}", i),
                    );
                    pass = false;
                    continue;
                }
                Moved::One(slot) => slot,
            };
            let (old_box, new_box) = match (old.get(slot), new.get(slot)) {
                (Some(a), Some(b)) => (a, b),
                _ => continue,
            };

            let direction = self
                .coupling(&new.robot, new_box)
                .or_else(|| self.coupling(&old.robot, old_box));
            let direction = match direction {
                Some(direction) => direction,
                None => {
                    report.fail(
                        Check::PushValidity,
                        Some(i),
                        FailureKind::NotInPushingPosition,
                        format!("robot not in pushing position but object moved at step {}", i),
                    );
                    pass = false;
                    continue;
                }
            };

            if let Err((kind, reason)) =
                self.push_validity(direction, &old.robot, &new.robot, old_box, new_box)
            {
                report.fail(Check::PushValidity, Some(i), kind, format!("{} at step {}", reason, i));
                pass = false;
            }
        }
        if pass {
            report.pass(Check::PushValidity);
        }
        pass
    }

    fn moved_objects(&self, old: &TrajectoryStep, new: &TrajectoryStep) -> Moved {
        let mut moved = Moved::Nothing;
        for ((slot, a), (_, b)) in old.objects().zip(new.objects()) {
            if a.position != b.position {
                if let Moved::One(_) = moved {
                    return Moved::Several;
                }
                moved = Moved::One(slot);
            }
        }
        moved
    }

    fn coupling(&self, robot: &RobotConfig, b: &MovableBox) -> Option<PushDirection> {
        let rule = OverlapRule {
            low_side: self.config.low_side_overlap,
            high_side: self.config.high_side_overlap,
        };
        coupling(
            robot,
            b,
            self.problem.robot_width(),
            self.config.tolerance,
            self.angle_tolerance,
            rule,
        )
    }

    /// The object moves along the push axis only, in the push direction,
    /// and exactly as far as the robot does (within tolerance).
    fn push_validity(
        &self,
        direction: PushDirection,
        old_robot: &RobotConfig,
        new_robot: &RobotConfig,
        old_box: &MovableBox,
        new_box: &MovableBox,
    ) -> Result<(), (FailureKind, &'static str)> {
        let tol = self.config.tolerance;
        let robot_delta =
            Point2D::from(new_robot.position.to_vector() - old_robot.position.to_vector());
        let box_delta = Point2D::from(new_box.position.to_vector() - old_box.position.to_vector());

        let moved_x = box_delta.x.abs() > tol;
        let moved_y = box_delta.y.abs() > tol;
        if moved_x && moved_y {
            return Err((FailureKind::WrongDirection, "object moved along both axes"));
        }
        let actual = if moved_y {
            Some(PushDirection::from_displacement(Axis::Y, box_delta.y))
        } else if moved_x {
            Some(PushDirection::from_displacement(Axis::X, box_delta.x))
        } else {
            None
        };
        if let Some(actual) = actual {
            if actual != direction {
                return Err((FailureKind::WrongDirection, "object pushed in wrong direction"));
            }
        }

        let axis = direction.axis();
        if (axis.of(&box_delta) - axis.of(&robot_delta)).abs() > tol {
            return Err((FailureKind::NotMovingWithRobot, "object not moving with robot"));
        }
        Ok(())
    }

    /// Final boxes whose position matches their goal within tolerance.
    pub fn count_goals(&self, trajectory: &Trajectory) -> usize {
        let tol = self.config.tolerance;
        let last = match trajectory.last() {
            Some(step) => step,
            None => return 0,
        };
        last.boxes
            .iter()
            .zip(self.problem.goals().iter())
            .filter(|(b, goal)| {
                (b.position.x - goal.x).abs() <= tol && (b.position.y - goal.y).abs() <= tol
            })
            .count()
    }
}
