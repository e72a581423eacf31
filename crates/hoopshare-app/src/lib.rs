// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod boxscore;
pub mod config;
pub mod minutes;
pub mod report;
pub mod season;
