//! Rectangle and segment collision kernel
//!
//! Every test here is closed: touching counts as intersecting. The planner
//! and the validator both go through these functions, and both shrink the
//! objects they test by their tolerance first, so resting contact is legal
//! in either.

use crate::common::{MovableBox, Point2D, Rect};

/// The unit square every object must stay inside
pub const ARENA: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 1.0,
    height: 1.0,
};

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn of(&self, p: &Point2D) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }

    /// `p` with this axis' coordinate replaced
    pub fn set(&self, p: &Point2D, value: f64) -> Point2D {
        match self {
            Axis::X => Point2D::new(value, p.y),
            Axis::Y => Point2D::new(p.x, value),
        }
    }

    pub fn other(&self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// Closed overlap test
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.min_x() <= b.max_x() && b.min_x() <= a.max_x() && a.min_y() <= b.max_y() && b.min_y() <= a.max_y()
}

/// Grow every edge by `delta`; a negative delta shrinks.
pub fn inflate(rect: &Rect, delta: f64) -> Rect {
    Rect::new(
        rect.x - delta,
        rect.y - delta,
        rect.width + 2.0 * delta,
        rect.height + 2.0 * delta,
    )
}

pub fn contains_point(rect: &Rect, p: &Point2D) -> bool {
    !rect.is_empty()
        && p.x >= rect.min_x()
        && p.x <= rect.max_x()
        && p.y >= rect.min_y()
        && p.y <= rect.max_y()
}

pub fn contains_rect(outer: &Rect, inner: &Rect) -> bool {
    !outer.is_empty()
        && !inner.is_empty()
        && inner.min_x() >= outer.min_x()
        && inner.max_x() <= outer.max_x()
        && inner.min_y() >= outer.min_y()
        && inner.max_y() <= outer.max_y()
}

/// Segment `p1`-`p2` against a closed rectangle (Liang-Barsky clipping).
pub fn segment_intersects_rect(p1: &Point2D, p2: &Point2D, rect: &Rect) -> bool {
    if rect.is_empty() {
        return false;
    }
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let bounds = [
        (-dx, p1.x - rect.min_x()),
        (dx, rect.max_x() - p1.x),
        (-dy, p1.y - rect.min_y()),
        (dy, rect.max_y() - p1.y),
    ];

    let mut t_enter = 0.0_f64;
    let mut t_exit = 1.0_f64;
    for &(p, q) in bounds.iter() {
        if p == 0.0 {
            // parallel to this edge: entirely outside or never clipped
            if q < 0.0 {
                return false;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            if t > t_exit {
                return false;
            }
            t_enter = t_enter.max(t);
        } else {
            if t < t_enter {
                return false;
            }
            t_exit = t_exit.min(t);
        }
    }
    t_enter <= t_exit
}

/// Area covered by `b` while it slides along `axis` until that coordinate
/// of its position equals `to`.
pub fn swept_rect(b: &MovableBox, axis: Axis, to: f64) -> Rect {
    let from = axis.of(&b.position);
    let lo = from.min(to);
    let extent = (to - from).abs() + b.width;
    match axis {
        Axis::X => Rect::new(lo, b.position.y, extent, b.width),
        Axis::Y => Rect::new(b.position.x, lo, b.width, extent),
    }
}
