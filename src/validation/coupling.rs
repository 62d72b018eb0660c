//! Robot-to-box coupling geometry
//!
//! A push is only legal when the robot's footprint lies flat against one
//! side of the box. The side it touches fixes the push direction.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::common::{MovableBox, Point2D, RobotConfig};
use crate::geometry::{inflate, segment_intersects_rect, Axis};

/// Direction a coupled robot pushes its box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PushDirection {
    Up,
    Right,
    Down,
    Left,
}

impl PushDirection {
    pub fn axis(&self) -> Axis {
        match self {
            PushDirection::Up | PushDirection::Down => Axis::Y,
            PushDirection::Right | PushDirection::Left => Axis::X,
        }
    }

    /// Direction of a displacement along `axis`
    pub fn from_displacement(axis: Axis, delta: f64) -> Self {
        match (axis, delta > 0.0) {
            (Axis::Y, true) => PushDirection::Up,
            (Axis::Y, false) => PushDirection::Down,
            (Axis::X, true) => PushDirection::Right,
            (Axis::X, false) => PushDirection::Left,
        }
    }
}

/// Footprint of an axis-aligned robot with its endpoints ordered low
/// (left or bottom) first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedFootprint {
    /// Axis the footprint lies along
    pub axis: Axis,
    pub low: Point2D,
    pub high: Point2D,
}

/// Largest orientation error still considered parallel to an axis.
pub fn angle_tolerance(tolerance: f64, robot_width: f64) -> f64 {
    ((tolerance / 2.0) / (robot_width / 2.0)).asin() * 2.0
}

/// The robot's footprint if its orientation is within `angle_tol` of a
/// multiple of a quarter turn.
pub fn aligned_footprint(robot: &RobotConfig, width: f64, angle_tol: f64) -> Option<AlignedFootprint> {
    let angle = robot.orientation.rem_euclid(2.0 * PI);
    let quarter = (angle / FRAC_PI_2).round();
    if (angle - quarter * FRAC_PI_2).abs() > angle_tol {
        return None;
    }

    let (p1, p2) = robot.endpoints(width);
    let footprint = match quarter as i64 % 4 {
        0 => AlignedFootprint { axis: Axis::X, low: p1, high: p2 },
        1 => AlignedFootprint { axis: Axis::Y, low: p1, high: p2 },
        2 => AlignedFootprint { axis: Axis::X, low: p2, high: p1 },
        _ => AlignedFootprint { axis: Axis::Y, low: p2, high: p1 },
    };
    Some(footprint)
}

/// Side-overlap thresholds as fractions of the robot width
#[derive(Debug, Clone, Copy)]
pub struct OverlapRule {
    /// Required when the footprint starts at or before the box's low edge
    pub low_side: f64,
    /// Required when the footprint starts inside the box's span
    pub high_side: f64,
}

/// Push direction if the robot sits flat against a side of `b`.
pub fn coupling(
    robot: &RobotConfig,
    b: &MovableBox,
    width: f64,
    tolerance: f64,
    angle_tol: f64,
    rule: OverlapRule,
) -> Option<PushDirection> {
    let footprint = aligned_footprint(robot, width, angle_tol)?;
    let rect = b.rect();
    if !segment_intersects_rect(&footprint.low, &footprint.high, &inflate(&rect, tolerance)) {
        return None;
    }

    let along = footprint.axis;
    let across = along.other();
    let side_lo = along.of(&b.position);
    let side_hi = side_lo + b.width;
    let m1 = along.of(&footprint.low);
    let m2 = along.of(&footprint.high);

    let overlaps = if m1 <= side_lo {
        m2 - side_lo >= rule.low_side * width
    } else {
        side_hi - m1 >= rule.high_side * width
    };
    if !overlaps {
        return None;
    }

    // robot on the low side of the box pushes towards the high side
    let below = across.of(&footprint.low) <= across.of(&b.position) + tolerance;
    Some(PushDirection::from_displacement(across, if below { 1.0 } else { -1.0 }))
}
