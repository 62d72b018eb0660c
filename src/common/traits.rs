//! Common traits defining interfaces for planners

use rand::Rng;

use crate::common::error::PushResult;

/// Trait for sampling-based planners that grow a tree of configurations
pub trait SamplingBasedPlanner {
    /// Tree node type
    type Node;
    /// Result of a successful planning run
    type Plan;

    /// Grow the tree until a plan is found or the iteration budget runs out
    fn plan<R: Rng + ?Sized>(&mut self, rng: &mut R) -> PushResult<Self::Plan>;

    /// Get the tree built during planning
    fn get_tree(&self) -> &[Self::Node];

    /// Set maximum iterations for planning
    fn set_max_iterations(&mut self, max_iter: usize);
}
