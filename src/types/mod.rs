pub mod action;
pub mod collision;
pub mod errors;
pub mod ids;
pub mod modification;
pub mod modpath;
pub mod report;

pub use action::*;
pub use collision::*;
pub use errors::*;
pub use ids::*;
pub use modification::*;
pub use modpath::*;
pub use report::*;
