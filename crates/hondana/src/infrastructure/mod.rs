pub mod config;
pub mod credential;
pub mod repositories;
pub mod trackers;
