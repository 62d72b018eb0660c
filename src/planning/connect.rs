//! Greedy goal connection
//!
//! Boxes are routed one by one, in slot order, to their nearest unclaimed
//! goal along an elbow path (horizontal then vertical, or the reverse).
//! Boxes already routed are treated as fixed at their goals; the coupling
//! between later and earlier routes is not searched, so some reachable goal
//! layouts are missed.

use log::{debug, info};

use crate::common::Point2D;
use crate::planning::configuration::{Axis, ChangeLog, Configuration, Slot};
use crate::planning::heuristic::nearest_goal;
use crate::planning::planner::BoxRoadmap;
use crate::planning::tree::NodeId;

impl BoxRoadmap {
    /// Try to route every box from `from` to a goal. On success the whole
    /// chain is appended to the tree and recorded as the solution; on
    /// failure the tree is left untouched.
    pub fn try_connect_goal(&mut self, from: NodeId) -> bool {
        let mut working = match self.tree.configuration(from) {
            Some(configuration) => configuration.clone(),
            None => return false,
        };
        let mut claimed = vec![false; self.goals.len()];
        let mut moves = Vec::new();

        for i in 0..working.boxes().len() {
            let slot = Slot::Box(i);
            let position = working.boxes()[i].position;
            let goal_index = match nearest_goal(&position, &self.goals, &claimed) {
                Some(g) => g,
                None => return false,
            };
            let goal = self.goals[goal_index];

            let legs = [Axis::X, Axis::Y]
                .iter()
                .find_map(|&first| self.elbow(&working, slot, first, &goal));
            let legs = match legs {
                Some(legs) => legs,
                None => {
                    debug!("goal connection from {:?}: box {} blocked", from, i);
                    return false;
                }
            };

            for leg in legs {
                working = working.with_change(&leg);
                moves.push(leg);
            }
            claimed[goal_index] = true;
        }

        let mut leaf = from;
        for change in moves {
            leaf = match self.tree.append(leaf, change) {
                Some(id) => id,
                None => return false,
            };
        }
        info!(
            "goal layout connected from {:?}, tree has {} nodes",
            from,
            self.tree.len()
        );
        self.solution = Some(leaf);
        true
    }

    /// Legs moving `slot` along `first` and then the other axis to `goal`,
    /// or `None` if either leg collides. Zero-length legs are dropped.
    fn elbow(
        &self,
        configuration: &Configuration,
        slot: Slot,
        first: Axis,
        goal: &Point2D,
    ) -> Option<Vec<ChangeLog>> {
        let mut current = configuration.clone();
        let mut legs = Vec::with_capacity(2);

        for &axis in [first, first.other()].iter() {
            let target = axis.of(goal);
            let at = axis.of(&current.get(slot)?.position);
            if at == target {
                continue;
            }
            if !self.is_motion_free(&current, slot, axis, target) {
                return None;
            }
            let leg = ChangeLog::new(slot, axis, target);
            current = current.with_change(&leg);
            legs.push(leg);
        }

        Some(legs)
    }
}
