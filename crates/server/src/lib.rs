pub mod routes;
pub mod startup;
pub mod errors;
pub mod openapi;
pub mod extract;

pub use startup::{build_app, build_state, run, run_with_shutdown};
