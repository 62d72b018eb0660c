//! Common types used throughout push_planner

use nalgebra::Vector2;

use crate::common::error::{PushError, PushResult};

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// Closed axis-aligned rectangle, `(x, y)` is the bottom-left corner.
///
/// A rectangle with a negative extent is empty and intersects nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_corners(min: Point2D, max: Point2D) -> Self {
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width < 0.0 || self.height < 0.0
    }
}

/// A movable square box.
///
/// Goal boxes and movable obstacles share this type; which role a box plays
/// is decided by the sequence that holds it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovableBox {
    /// Bottom-left corner
    pub position: Point2D,
    pub width: f64,
}

impl MovableBox {
    pub fn new(position: Point2D, width: f64) -> Self {
        Self { position, width }
    }

    /// Builds a box from its centre point, the way problem files describe them.
    pub fn from_center(center: Point2D, width: f64) -> Self {
        Self::new(Point2D::new(center.x - width / 2.0, center.y - width / 2.0), width)
    }

    /// Same box at another position
    pub fn with_position(&self, position: Point2D) -> Self {
        Self::new(position, self.width)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.width, self.width)
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(self.position.x + self.width / 2.0, self.position.y + self.width / 2.0)
    }
}

/// Fixed rectangular obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticObstacle {
    pub rect: Rect,
}

impl StaticObstacle {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }

    pub fn from_corners(min: Point2D, max: Point2D) -> Self {
        Self::new(Rect::from_corners(min, max))
    }
}

/// Robot pose: centre position and orientation in radians.
///
/// The robot occupies a segment of length `width` through its centre along
/// `(cos(orientation), sin(orientation))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotConfig {
    pub position: Point2D,
    pub orientation: f64,
}

impl RobotConfig {
    pub fn new(position: Point2D, orientation: f64) -> Self {
        Self { position, orientation }
    }

    /// Footprint endpoints `(centre - half, centre + half)` along the orientation.
    pub fn endpoints(&self, width: f64) -> (Point2D, Point2D) {
        let half = Vector2::new(self.orientation.cos(), self.orientation.sin()) * (width * 0.5);
        let centre = self.position.to_vector();
        (Point2D::from(centre - half), Point2D::from(centre + half))
    }
}

/// A complete problem instance: robot, movable objects, static obstacles and goals.
#[derive(Debug, Clone)]
pub struct Problem {
    robot_width: f64,
    initial_robot: RobotConfig,
    boxes: Vec<MovableBox>,
    obstacles: Vec<MovableBox>,
    static_obstacles: Vec<StaticObstacle>,
    goals: Vec<Point2D>,
}

impl Problem {
    /// Checks the layout up front so nothing malformed reaches the planner
    /// or the validator.
    pub fn new(
        robot_width: f64,
        initial_robot: RobotConfig,
        boxes: Vec<MovableBox>,
        obstacles: Vec<MovableBox>,
        static_obstacles: Vec<StaticObstacle>,
        goals: Vec<Point2D>,
    ) -> PushResult<Self> {
        if !(robot_width > 0.0 && robot_width <= 1.0) {
            return Err(PushError::InvalidProblem(format!(
                "robot width {} must be in (0, 1]",
                robot_width
            )));
        }
        if !initial_robot.position.is_finite() || !initial_robot.orientation.is_finite() {
            return Err(PushError::InvalidProblem("initial robot pose is not finite".to_string()));
        }
        if goals.len() != boxes.len() {
            return Err(PushError::InvalidProblem(format!(
                "{} goal positions given for {} movable boxes",
                goals.len(),
                boxes.len()
            )));
        }
        for (kind, list) in [("box", &boxes), ("obstacle", &obstacles)].iter() {
            for (i, b) in list.iter().enumerate() {
                if !(b.width > 0.0 && b.width <= 1.0) || !b.position.is_finite() {
                    return Err(PushError::InvalidProblem(format!(
                        "movable {} {} has invalid geometry {:?}",
                        kind, i, b
                    )));
                }
            }
        }
        if let Some(i) = goals.iter().position(|g| !g.is_finite()) {
            return Err(PushError::InvalidProblem(format!("goal {} is not finite", i)));
        }

        Ok(Self {
            robot_width,
            initial_robot,
            boxes,
            obstacles,
            static_obstacles,
            goals,
        })
    }

    pub fn robot_width(&self) -> f64 {
        self.robot_width
    }

    pub fn initial_robot(&self) -> RobotConfig {
        self.initial_robot
    }

    pub fn boxes(&self) -> &[MovableBox] {
        &self.boxes
    }

    pub fn obstacles(&self) -> &[MovableBox] {
        &self.obstacles
    }

    pub fn static_obstacles(&self) -> &[StaticObstacle] {
        &self.static_obstacles
    }

    /// Goal positions (bottom-left corners), index-aligned with `boxes`.
    pub fn goals(&self) -> &[Point2D] {
        &self.goals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_problem(goals: Vec<Point2D>) -> PushResult<Problem> {
        Problem::new(
            0.1,
            RobotConfig::new(Point2D::new(0.55, 0.45), 0.0),
            vec![MovableBox::new(Point2D::new(0.5, 0.5), 0.1)],
            Vec::new(),
            Vec::new(),
            goals,
        )
    }

    #[test]
    fn test_point2d_distance() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(3.0, 4.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_box_from_center() {
        let b = MovableBox::from_center(Point2D::new(0.55, 0.55), 0.1);
        assert!((b.position.x - 0.5).abs() < 1e-12);
        assert!((b.center().y - 0.55).abs() < 1e-12);
        assert!((b.rect().max_x() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_robot_endpoints() {
        let robot = RobotConfig::new(Point2D::new(0.5, 0.5), std::f64::consts::FRAC_PI_2);
        let (p1, p2) = robot.endpoints(0.2);
        assert!((p1.x - 0.5).abs() < 1e-12 && (p1.y - 0.4).abs() < 1e-12);
        assert!((p2.x - 0.5).abs() < 1e-12 && (p2.y - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_problem_rejects_goal_count_mismatch() {
        let result = unit_problem(Vec::new());
        assert!(matches!(result, Err(PushError::InvalidProblem(_))));
    }

    #[test]
    fn test_problem_accepts_aligned_goals() {
        let problem = unit_problem(vec![Point2D::new(0.5, 0.6)]).unwrap();
        assert_eq!(problem.goals().len(), problem.boxes().len());
    }

    #[test]
    fn test_empty_rect() {
        assert!(Rect::new(0.0, 0.0, -0.1, 0.2).is_empty());
        assert!(!Rect::new(0.0, 0.0, 0.0, 0.0).is_empty());
    }
}
