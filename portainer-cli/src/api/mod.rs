pub mod client;
pub mod configs;
pub mod stacks;

pub use client::{ClientOptions, DEFAULT_TIMEOUT, PortainerApi, Session};
pub use stacks::{DeployOutcome, StackApi, deploy_or_update, stack_id_by_name};
