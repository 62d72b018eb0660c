//! Distance metrics over configurations

use crate::common::Point2D;
use crate::planning::configuration::Configuration;

/// Sum over goal boxes of the distance to the nearest goal position.
///
/// Goals may be shared between boxes here, so this is cheaper than (and
/// bounded above by) the best one-to-one assignment.
pub fn heuristic(configuration: &Configuration, goals: &[Point2D]) -> f64 {
    configuration
        .boxes()
        .iter()
        .map(|b| {
            goals
                .iter()
                .map(|g| b.position.distance(g))
                .fold(f64::INFINITY, f64::min)
        })
        .filter(|d| d.is_finite())
        .sum()
}

/// Sum of same-slot position distances over boxes and obstacles.
pub fn configuration_distance(a: &Configuration, b: &Configuration) -> f64 {
    a.objects()
        .zip(b.objects())
        .map(|((_, x), (_, y))| x.position.distance(&y.position))
        .sum()
}

/// Index of the closest unclaimed goal; the first one checked wins ties.
pub fn nearest_goal(position: &Point2D, goals: &[Point2D], claimed: &[bool]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, goal) in goals.iter().enumerate() {
        if claimed.get(i).copied().unwrap_or(false) {
            continue;
        }
        let d = position.distance(goal);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}
