//! Robot trajectory with the induced box and obstacle layouts

use crate::common::{MovableBox, RobotConfig};
use crate::planning::configuration::Slot;

/// One discrete time step of a solution
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryStep {
    pub robot: RobotConfig,
    pub boxes: Vec<MovableBox>,
    pub obstacles: Vec<MovableBox>,
}

impl TrajectoryStep {
    pub fn new(robot: RobotConfig, boxes: Vec<MovableBox>, obstacles: Vec<MovableBox>) -> Self {
        Self {
            robot,
            boxes,
            obstacles,
        }
    }

    pub fn get(&self, slot: Slot) -> Option<&MovableBox> {
        match slot {
            Slot::Box(i) => self.boxes.get(i),
            Slot::Obstacle(i) => self.obstacles.get(i),
        }
    }

    /// Every movable object with its slot, goal boxes first
    pub fn objects(&self) -> impl Iterator<Item = (Slot, &MovableBox)> + '_ {
        let boxes = self.boxes.iter().enumerate().map(|(i, b)| (Slot::Box(i), b));
        let obstacles = self
            .obstacles
            .iter()
            .enumerate()
            .map(|(i, b)| (Slot::Obstacle(i), b));
        boxes.chain(obstacles)
    }
}

/// Full solution: the first step is expected to be the initial state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    steps: Vec<TrajectoryStep>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn from_steps(steps: Vec<TrajectoryStep>) -> Self {
        Self { steps }
    }

    pub fn push(&mut self, step: TrajectoryStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[TrajectoryStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last(&self) -> Option<&TrajectoryStep> {
        self.steps.last()
    }
}
