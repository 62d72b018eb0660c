// Pushing trajectory validation

pub mod trajectory;
pub mod report;
pub mod coupling;
pub mod validator;

pub use trajectory::*;
pub use report::*;
pub use coupling::*;
pub use validator::*;
