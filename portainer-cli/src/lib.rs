pub mod api;
pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod input;
pub mod output;
