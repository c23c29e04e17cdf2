pub mod error;
pub mod merge;
pub mod reconcile;
pub mod resolve;
pub mod service;
pub mod task;
pub mod team;
pub mod validate;

pub use error::*;
pub use merge::{merge, merge_into};
pub use reconcile::*;
pub use resolve::*;
pub use service::*;
pub use task::*;
pub use team::*;
pub use validate::*;
