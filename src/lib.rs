//! push_planner - box relocation planning for a pushing robot
//!
//! A sampling-based roadmap planner over box and obstacle layouts, and a
//! validator that checks a step-by-step robot trajectory against the
//! pushing model.

// Core modules
pub mod common;
pub mod geometry;

// Algorithm modules
pub mod planning;
pub mod validation;

// Re-export common types for convenience
pub use common::{MovableBox, Point2D, Problem, Rect, RobotConfig, StaticObstacle};
pub use common::SamplingBasedPlanner;
pub use common::{InsertError, PushError, PushResult};
pub use planning::{BoxRoadmap, PlannerConfig, RoadmapPlan};
pub use validation::{SolutionValidator, Trajectory, TrajectoryStep, ValidationReport, ValidatorConfig};
