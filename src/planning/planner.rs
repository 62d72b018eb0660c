//! Sampling-based roadmap planner over box layouts
//!
//! The tree is grown by relocating one movable object along one axis at a
//! time. Samples are drawn from random tree nodes, the nearest node is
//! extended towards them as far as the motion stays collision free, and
//! nodes close to the goal layout trigger a greedy elbow-path connection
//! attempt (see `connect.rs`).

use itertools::Itertools;
use log::{debug, info, warn};
use rand::Rng;
use rand_distr::{Bernoulli, Distribution, Uniform};

use crate::common::{
    InsertError, Point2D, Problem, PushError, PushResult, Rect, SamplingBasedPlanner,
    StaticObstacle,
};
use crate::geometry::{inflate, intersects, swept_rect};
use crate::planning::configuration::{Axis, ChangeLog, Configuration, Slot};
use crate::planning::heuristic::heuristic;
use crate::planning::tree::{NodeId, RoadmapNode, RoadmapTree};

/// Configuration for the roadmap planner
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Longest single relocation added to the tree
    pub max_edge_length: f64,
    /// Extensions shorter than this are abandoned
    pub min_step: f64,
    /// Heuristic distance below which goal connection is attempted
    pub goal_threshold: f64,
    /// Samples drawn by `grow` before giving up
    pub max_sample_attempts: usize,
    /// Grow/insert rounds run by `plan`
    pub max_iterations: usize,
    /// Overlap depth tolerated between objects, so resting contact is legal
    pub tolerance: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_edge_length: 0.5,
            min_step: 0.01,
            goal_threshold: 0.5,
            max_sample_attempts: 10_000,
            max_iterations: 10_000,
            tolerance: 0.0001,
        }
    }
}

/// A sampled relocation of one object of `parent`
#[derive(Debug, Clone)]
pub struct Candidate {
    pub parent: NodeId,
    pub change: ChangeLog,
    pub configuration: Configuration,
}

/// Outcome of a successful insertion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Insertion {
    pub node: NodeId,
    pub goal_reached: bool,
}

/// Root-to-goal walk through the roadmap
#[derive(Debug, Clone)]
pub struct RoadmapPlan {
    pub nodes: Vec<NodeId>,
    pub moves: Vec<ChangeLog>,
    pub configurations: Vec<Configuration>,
}

impl RoadmapPlan {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn final_configuration(&self) -> Option<&Configuration> {
        self.configurations.last()
    }
}

/// Roadmap planner for the box pushing problem
pub struct BoxRoadmap {
    pub(crate) config: PlannerConfig,
    pub(crate) static_obstacles: Vec<StaticObstacle>,
    pub(crate) goals: Vec<Point2D>,
    pub(crate) tree: RoadmapTree,
    pub(crate) solution: Option<NodeId>,
    coin: Bernoulli,
}

impl BoxRoadmap {
    /// Create a planner rooted at the problem's initial layout
    pub fn new(problem: &Problem, config: PlannerConfig) -> PushResult<Self> {
        if !(config.max_edge_length > 0.0) || !(config.min_step > 0.0) {
            return Err(PushError::InvalidParameter(format!(
                "edge length {} and minimum step {} must be positive",
                config.max_edge_length, config.min_step
            )));
        }
        if !(config.tolerance >= 0.0) || config.tolerance >= config.min_step {
            return Err(PushError::InvalidParameter(format!(
                "tolerance {} must be in [0, minimum step {})",
                config.tolerance, config.min_step
            )));
        }
        if config.min_step > config.max_edge_length {
            return Err(PushError::InvalidParameter(format!(
                "minimum step {} exceeds edge length {}",
                config.min_step, config.max_edge_length
            )));
        }
        if problem.boxes().is_empty() && problem.obstacles().is_empty() {
            return Err(PushError::InvalidProblem(
                "no movable boxes or obstacles to plan for".to_string(),
            ));
        }
        let coin = Bernoulli::new(0.5).map_err(|e| PushError::InvalidParameter(e.to_string()))?;

        let root = Configuration::new(problem.boxes().to_vec(), problem.obstacles().to_vec());
        Ok(BoxRoadmap {
            config,
            static_obstacles: problem.static_obstacles().to_vec(),
            goals: problem.goals().to_vec(),
            tree: RoadmapTree::new(root),
            solution: None,
            coin,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn tree(&self) -> &RoadmapTree {
        &self.tree
    }

    pub fn goals(&self) -> &[Point2D] {
        &self.goals
    }

    /// Last node of the goal chain, once a connection succeeded
    pub fn solution(&self) -> Option<NodeId> {
        self.solution
    }

    /// No two movable objects overlap and none overlaps a static obstacle.
    /// Each object is shrunk by the tolerance first, so touching is allowed.
    pub fn is_free(&self, configuration: &Configuration) -> bool {
        let tol = self.config.tolerance;
        let rects: Vec<Rect> = configuration.objects().map(|(_, b)| b.rect()).collect();
        let overlapping = rects
            .iter()
            .tuple_combinations()
            .any(|(a, b)| intersects(&inflate(a, -tol), b));

        !overlapping && rects.iter().all(|r| !self.hits_static(&inflate(r, -tol)))
    }

    /// Whether `slot` can slide along `axis` to `to` without overlapping anything.
    pub(crate) fn is_motion_free(
        &self,
        configuration: &Configuration,
        slot: Slot,
        axis: Axis,
        to: f64,
    ) -> bool {
        let moving = match configuration.get(slot) {
            Some(b) => b,
            None => return false,
        };
        let swept = inflate(&swept_rect(moving, axis, to), -self.config.tolerance);

        let blocked = configuration
            .objects()
            .filter(|(other, _)| *other != slot)
            .any(|(_, b)| intersects(&swept, &b.rect()));

        !blocked && !self.hits_static(&swept)
    }

    fn hits_static(&self, rect: &Rect) -> bool {
        self.static_obstacles.iter().any(|o| intersects(rect, &o.rect))
    }

    /// Draw a random single-coordinate relocation of a random tree node.
    ///
    /// The flag tells whether the candidate layout is collision free.
    pub fn sample_move<R: Rng + ?Sized>(&self, rng: &mut R) -> (Candidate, bool) {
        let parent = NodeId(rng.gen_range(0..self.tree.len()));
        let base = &self.tree.nodes()[parent.0].configuration;

        let n_boxes = base.boxes().len();
        let n_obstacles = base.obstacles().len();
        let move_box = match (n_boxes, n_obstacles) {
            (0, _) => false,
            (_, 0) => true,
            _ => self.coin.sample(rng),
        };
        let slot = if move_box {
            Slot::Box(rng.gen_range(0..n_boxes))
        } else {
            Slot::Obstacle(rng.gen_range(0..n_obstacles))
        };
        let axis = if self.coin.sample(rng) { Axis::X } else { Axis::Y };

        let width = base.get(slot).map(|b| b.width).unwrap_or(1.0);
        let value = Uniform::new_inclusive(0.0, (1.0 - width).max(0.0)).sample(rng);

        let change = ChangeLog::new(slot, axis, value);
        let configuration = base.with_change(&change);
        let valid = self.is_free(&configuration);

        (
            Candidate {
                parent,
                change,
                configuration,
            },
            valid,
        )
    }

    /// Sample until a collision-free candidate turns up.
    pub fn grow<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Candidate> {
        for _ in 0..self.config.max_sample_attempts {
            let (candidate, valid) = self.sample_move(rng);
            if valid {
                return Some(candidate);
            }
        }
        None
    }

    /// Extend the nearest node towards `candidate` and append the result.
    ///
    /// Only the candidate's moved slot is relocated, so every edge changes a
    /// single coordinate.
    pub fn insert(&mut self, candidate: Candidate) -> Result<Insertion, InsertError> {
        let near = self
            .tree
            .nearest(&candidate.configuration)
            .ok_or(InsertError::NoNearestConfiguration)?;
        let change = self.extend(near, &candidate.change)?;
        let node = self
            .tree
            .append(near, change)
            .ok_or(InsertError::NoNearestConfiguration)?;

        let configuration = &self.tree.nodes()[node.0].configuration;
        let goal_reached = heuristic(configuration, &self.goals) < self.config.goal_threshold
            && self.try_connect_goal(node);

        Ok(Insertion { node, goal_reached })
    }

    /// Longest free step from `near` towards `target`, halving on collision.
    fn extend(&self, near: NodeId, target: &ChangeLog) -> Result<ChangeLog, InsertError> {
        let configuration = self
            .tree
            .configuration(near)
            .ok_or(InsertError::NoNearestConfiguration)?;
        let from = configuration
            .get(target.slot)
            .map(|b| target.axis.of(&b.position))
            .ok_or(InsertError::NoNearestConfiguration)?;

        let distance = (target.value - from).abs();
        let direction = (target.value - from).signum();
        let mut step = distance.min(self.config.max_edge_length);

        while step >= self.config.min_step {
            let to = if step == distance {
                target.value
            } else {
                from + direction * step
            };
            if self.is_motion_free(configuration, target.slot, target.axis, to) {
                return Ok(ChangeLog::new(target.slot, target.axis, to));
            }
            step /= 2.0;
        }

        Err(InsertError::NoLegalExtension {
            slot: target.slot,
            from,
            to: target.value,
        })
    }

    /// Root-to-`leaf` plan with the move label of every edge.
    pub fn extract_plan(&self, leaf: NodeId) -> RoadmapPlan {
        let mut nodes = self.tree.path_to_root(leaf);
        nodes.reverse();

        let moves = nodes
            .iter()
            .filter_map(|id| self.tree.get(*id).and_then(|node| node.change))
            .collect();
        let configurations = nodes
            .iter()
            .filter_map(|id| self.tree.configuration(*id).cloned())
            .collect();

        RoadmapPlan {
            nodes,
            moves,
            configurations,
        }
    }
}

impl SamplingBasedPlanner for BoxRoadmap {
    type Node = RoadmapNode;
    type Plan = RoadmapPlan;

    fn plan<R: Rng + ?Sized>(&mut self, rng: &mut R) -> PushResult<RoadmapPlan> {
        if self.solution.is_none() {
            let root = self.tree.root();
            self.try_connect_goal(root);
        }

        let mut iteration = 0;
        while self.solution.is_none() && iteration < self.config.max_iterations {
            iteration += 1;
            if iteration % 1000 == 0 {
                info!("Iter: {}, number of nodes: {}", iteration, self.tree.len());
            }

            match self.grow(rng) {
                Some(candidate) => {
                    if let Err(e) = self.insert(candidate) {
                        debug!("iteration {}: {}", iteration, e);
                    }
                }
                None => debug!("iteration {}: no free sample found", iteration),
            }
        }

        match self.solution {
            Some(leaf) => Ok(self.extract_plan(leaf)),
            None => {
                warn!(
                    "no goal connection after {} iterations ({} nodes)",
                    iteration,
                    self.tree.len()
                );
                Err(PushError::Planning(format!(
                    "cannot reach the goal layout within {} iterations",
                    self.config.max_iterations
                )))
            }
        }
    }

    fn get_tree(&self) -> &[RoadmapNode] {
        self.tree.nodes()
    }

    fn set_max_iterations(&mut self, max_iter: usize) {
        self.config.max_iterations = max_iter;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{MovableBox, RobotConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn problem(
        boxes: &[(f64, f64)],
        obstacles: &[(f64, f64, f64)],
        statics: &[Rect],
        goals: &[(f64, f64)],
    ) -> Problem {
        Problem::new(
            0.1,
            RobotConfig::new(Point2D::new(0.05, 0.95), 0.0),
            boxes
                .iter()
                .map(|&(x, y)| MovableBox::new(Point2D::new(x, y), 0.1))
                .collect(),
            obstacles
                .iter()
                .map(|&(x, y, w)| MovableBox::new(Point2D::new(x, y), w))
                .collect(),
            statics.iter().map(|&r| StaticObstacle::new(r)).collect(),
            goals.iter().map(|&g| Point2D::from(g)).collect(),
        )
        .unwrap()
    }

    fn planner(problem: &Problem) -> BoxRoadmap {
        BoxRoadmap::new(problem, PlannerConfig::default()).unwrap()
    }

    fn root_candidate(roadmap: &BoxRoadmap, change: ChangeLog) -> Candidate {
        let root = roadmap.tree().root();
        Candidate {
            parent: root,
            change,
            configuration: roadmap.tree().configuration(root).unwrap().with_change(&change),
        }
    }

    #[test]
    fn test_planner_config_default() {
        let config = PlannerConfig::default();
        assert_eq!(config.max_edge_length, 0.5);
        assert_eq!(config.min_step, 0.01);
        assert_eq!(config.max_sample_attempts, 10_000);
        assert_eq!(config.tolerance, 0.0001);
    }

    #[test]
    fn test_rejects_bad_config() {
        let p = problem(&[(0.1, 0.1)], &[], &[], &[(0.5, 0.5)]);
        let config = PlannerConfig {
            min_step: 0.6,
            ..Default::default()
        };
        assert!(matches!(
            BoxRoadmap::new(&p, config),
            Err(PushError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rejects_tolerance_above_min_step() {
        let p = problem(&[(0.1, 0.1)], &[], &[], &[(0.5, 0.5)]);
        let config = PlannerConfig {
            tolerance: 0.02,
            ..Default::default()
        };
        assert!(BoxRoadmap::new(&p, config).is_err());
    }

    #[test]
    fn test_is_free_disjoint_layout() {
        let p = problem(
            &[(0.1, 0.1), (0.5, 0.5)],
            &[(0.7, 0.1, 0.2)],
            &[Rect::new(0.3, 0.8, 0.2, 0.1)],
            &[(0.1, 0.3), (0.3, 0.5)],
        );
        let roadmap = planner(&p);
        let root = roadmap.tree().configuration(roadmap.tree().root()).unwrap();
        assert!(roadmap.is_free(root));
    }

    #[test]
    fn test_is_free_detects_overlaps() {
        let p = problem(
            &[(0.1, 0.1)],
            &[(0.15, 0.15, 0.2)],
            &[],
            &[(0.5, 0.5)],
        );
        let roadmap = planner(&p);
        let root = roadmap.tree().configuration(roadmap.tree().root()).unwrap();
        assert!(!roadmap.is_free(root));

        let p = problem(&[(0.1, 0.1)], &[], &[Rect::new(0.15, 0.0, 0.1, 0.3)], &[(0.5, 0.5)]);
        let roadmap = planner(&p);
        let root = roadmap.tree().configuration(roadmap.tree().root()).unwrap();
        assert!(!roadmap.is_free(root));
    }

    #[test]
    fn test_is_free_rejects_coincident_slots() {
        let p = problem(&[(0.3, 0.3), (0.3, 0.3)], &[], &[], &[(0.1, 0.8), (0.6, 0.8)]);
        let roadmap = planner(&p);
        let root = roadmap.tree().configuration(roadmap.tree().root()).unwrap();
        assert!(!roadmap.is_free(root));

        let p = problem(&[(0.3, 0.3)], &[(0.3, 0.3, 0.1)], &[], &[(0.1, 0.8)]);
        let roadmap = planner(&p);
        let root = roadmap.tree().configuration(roadmap.tree().root()).unwrap();
        assert!(!roadmap.is_free(root));
    }

    #[test]
    fn test_is_free_allows_resting_contact() {
        let p = problem(
            &[(0.3, 0.1), (0.4, 0.1)],
            &[],
            &[Rect::new(0.2, 0.0, 0.1, 0.3)],
            &[(0.1, 0.8), (0.6, 0.8)],
        );
        let roadmap = planner(&p);
        let root = roadmap.tree().configuration(roadmap.tree().root()).unwrap();
        assert!(roadmap.is_free(root));
    }

    #[test]
    fn test_sample_move_changes_one_coordinate() {
        let p = problem(&[(0.1, 0.1), (0.5, 0.1)], &[(0.1, 0.6, 0.3)], &[], &[(0.2, 0.8), (0.6, 0.8)]);
        let roadmap = planner(&p);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let (candidate, valid) = roadmap.sample_move(&mut rng);
            let parent = roadmap.tree().configuration(candidate.parent).unwrap();
            let diff = candidate.configuration.differences(parent);
            assert!(diff.len() <= 1);

            let moved = candidate.configuration.get(candidate.change.slot).unwrap();
            assert_eq!(candidate.change.axis.of(&moved.position), candidate.change.value);
            assert!(candidate.change.value >= 0.0 && candidate.change.value <= 1.0 - moved.width);
            assert_eq!(valid, roadmap.is_free(&candidate.configuration));
        }
    }

    #[test]
    fn test_grow_returns_free_candidate() {
        let p = problem(&[(0.1, 0.1)], &[(0.4, 0.4, 0.2)], &[Rect::new(0.0, 0.7, 1.0, 0.1)], &[(0.8, 0.2)]);
        let roadmap = planner(&p);
        let mut rng = StdRng::seed_from_u64(3);
        let candidate = roadmap.grow(&mut rng).unwrap();
        assert!(roadmap.is_free(&candidate.configuration));
    }

    #[test]
    fn test_insert_caps_edge_length() {
        let p = problem(&[(0.1, 0.1)], &[], &[], &[(0.1, 0.9)]);
        let mut roadmap = planner(&p);
        let candidate = root_candidate(&roadmap, ChangeLog::new(Slot::Box(0), Axis::X, 0.9));

        let insertion = roadmap.insert(candidate).unwrap();
        let config = roadmap.tree().configuration(insertion.node).unwrap();
        assert!((config.boxes()[0].position.x - 0.6).abs() < 1e-12);
        assert!(!insertion.goal_reached);
    }

    #[test]
    fn test_insert_halves_until_free() {
        let p = problem(&[(0.1, 0.1)], &[], &[Rect::new(0.42, 0.0, 0.05, 1.0)], &[(0.1, 0.9)]);
        let mut roadmap = planner(&p);
        let candidate = root_candidate(&roadmap, ChangeLog::new(Slot::Box(0), Axis::X, 0.9));

        let insertion = roadmap.insert(candidate).unwrap();
        let config = roadmap.tree().configuration(insertion.node).unwrap();
        assert!((config.boxes()[0].position.x - 0.225).abs() < 1e-12);
        assert!(roadmap.is_free(config));
    }

    #[test]
    fn test_insert_without_room_fails() {
        let p = problem(&[(0.45, 0.45)], &[], &[Rect::new(0.3, 0.0, 0.15, 1.0)], &[(0.8, 0.8)]);
        let mut roadmap = planner(&p);
        let candidate = root_candidate(&roadmap, ChangeLog::new(Slot::Box(0), Axis::X, 0.0));

        let result = roadmap.insert(candidate);
        assert!(matches!(result, Err(InsertError::NoLegalExtension { .. })));
        assert_eq!(roadmap.tree().len(), 1);
    }

    #[test]
    fn test_box_against_wall_moves_away_and_along() {
        let p = problem(&[(0.3, 0.1)], &[], &[Rect::new(0.2, 0.0, 0.1, 0.3)], &[(0.7, 0.7)]);
        let mut roadmap = planner(&p);

        let away = root_candidate(&roadmap, ChangeLog::new(Slot::Box(0), Axis::X, 0.6));
        let insertion = roadmap.insert(away).unwrap();
        let config = roadmap.tree().configuration(insertion.node).unwrap();
        assert_eq!(config.boxes()[0].position, Point2D::new(0.6, 0.1));

        let along = root_candidate(&roadmap, ChangeLog::new(Slot::Box(0), Axis::Y, 0.15));
        let insertion = roadmap.insert(along).unwrap();
        let config = roadmap.tree().configuration(insertion.node).unwrap();
        assert_eq!(config.boxes()[0].position, Point2D::new(0.3, 0.15));

        let into = root_candidate(&roadmap, ChangeLog::new(Slot::Box(0), Axis::X, 0.0));
        assert!(matches!(roadmap.insert(into), Err(InsertError::NoLegalExtension { .. })));
    }

    #[test]
    fn test_plan_starts_from_wall_contact() {
        let p = problem(&[(0.3, 0.1)], &[], &[Rect::new(0.2, 0.0, 0.1, 0.3)], &[(0.7, 0.7)]);
        let mut roadmap = planner(&p);
        roadmap.set_max_iterations(200);
        let mut rng = StdRng::seed_from_u64(2);

        let plan = roadmap.plan(&mut rng).unwrap();
        assert!(plan.len() > 1);
        assert_eq!(plan.final_configuration().unwrap().boxes()[0].position, Point2D::new(0.7, 0.7));
    }

    #[test]
    fn test_grown_tree_is_sound() {
        let p = problem(
            &[(0.1, 0.1), (0.6, 0.2)],
            &[(0.3, 0.6, 0.2)],
            &[Rect::new(0.45, 0.0, 0.05, 0.4)],
            &[(0.85, 0.85), (0.05, 0.85)],
        );
        let config = PlannerConfig {
            goal_threshold: 0.0,
            ..Default::default()
        };
        let mut roadmap = BoxRoadmap::new(&p, config).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..300 {
            if let Some(candidate) = roadmap.grow(&mut rng) {
                let _ = roadmap.insert(candidate);
            }
        }
        assert!(roadmap.tree().len() > 1);

        let tree = roadmap.tree();
        for (i, node) in tree.nodes().iter().enumerate() {
            let id = NodeId(i);
            assert!(roadmap.is_free(&node.configuration));
            assert_eq!(tree.replay(id).as_ref(), Some(&node.configuration));
            if let Some(parent) = node.parent {
                let diff = node.configuration.differences(tree.configuration(parent).unwrap());
                assert_eq!(diff.len(), 1);
                assert_eq!(diff[0].1.len(), 1);
                let change = node.change.unwrap();
                assert_eq!(diff[0], (change.slot, vec![change.axis]));
            }
        }
    }

    #[test]
    fn test_plan_connects_from_root() {
        let p = problem(&[(0.1, 0.1)], &[], &[], &[(0.4, 0.6)]);
        let mut roadmap = planner(&p);
        let mut rng = StdRng::seed_from_u64(1);

        let plan = roadmap.plan(&mut rng).unwrap();
        assert_eq!(
            plan.moves,
            vec![
                ChangeLog::new(Slot::Box(0), Axis::X, 0.4),
                ChangeLog::new(Slot::Box(0), Axis::Y, 0.6),
            ]
        );
        assert_eq!(plan.final_configuration().unwrap().boxes()[0].position, Point2D::new(0.4, 0.6));
    }

    #[test]
    fn test_plan_grows_around_walls() {
        let p = problem(
            &[(0.1, 0.1)],
            &[],
            &[Rect::new(0.5, 0.0, 0.05, 0.3), Rect::new(0.0, 0.5, 0.3, 0.05)],
            &[(0.8, 0.8)],
        );
        let mut roadmap = planner(&p);
        let mut rng = StdRng::seed_from_u64(11);

        let plan = roadmap.plan(&mut rng).unwrap();
        let last = plan.final_configuration().unwrap();
        assert_eq!(last.boxes()[0].position, Point2D::new(0.8, 0.8));
        assert!(plan.configurations.iter().all(|c| roadmap.is_free(c)));
        assert_eq!(plan.moves.len() + 1, plan.nodes.len());
    }

    #[test]
    fn test_plan_gives_up_on_unreachable_goal() {
        let p = problem(&[(0.1, 0.1)], &[], &[Rect::new(0.6, 0.6, 0.3, 0.3)], &[(0.7, 0.7)]);
        let mut roadmap = planner(&p);
        roadmap.set_max_iterations(50);
        let mut rng = StdRng::seed_from_u64(5);

        assert!(matches!(roadmap.plan(&mut rng), Err(PushError::Planning(_))));
        assert!(roadmap.solution().is_none());
        assert!(!roadmap.get_tree().is_empty());
    }
}
