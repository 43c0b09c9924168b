//! SeaORM entities for the blog schema plus the connection pool.
//!
//! Each entity module carries its own validation helpers and the handful of
//! write paths the service layer builds on.

pub mod errors;
pub mod db;
pub mod role;
pub mod user;
pub mod post;

#[cfg(test)]
mod tests;
