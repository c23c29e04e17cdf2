pub mod common;
pub mod entity;
pub mod project;
pub mod task;
pub mod team;
pub mod user;

pub use common::*;
pub use entity::*;
pub use project::*;
pub use task::*;
pub use team::*;
pub use user::*;
