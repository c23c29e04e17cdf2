pub mod handlers;
pub mod routes;
pub mod task_handlers;
pub mod team_handlers;

pub use handlers::*;
pub use routes::*;
