// Library root: re-exports all modules so integration tests and the binary
// can reach the crate's public API.

pub mod build;
pub mod config;
pub mod lineup;
pub mod pool;
pub mod run;
pub mod sim;
