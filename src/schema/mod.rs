pub mod stat_groups;
pub mod tables;
pub mod types;

pub use stat_groups::*;
pub use tables::*;
pub use types::*;
