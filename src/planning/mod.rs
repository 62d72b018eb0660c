// Box relocation planning module

pub mod configuration;
pub mod heuristic;
pub mod tree;
pub mod planner;
mod connect;

pub use configuration::*;
pub use heuristic::*;
pub use tree::*;
pub use planner::*;
