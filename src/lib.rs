pub mod catalog;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod extract;
pub mod grading;
pub mod handlers;
pub mod srs;
pub mod state;

#[cfg(test)]
pub mod testing;
