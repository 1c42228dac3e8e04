//! Azure DevOps integration through the `az` command line.
//!
//! Every call shells out to `az ... --output json` with a JMESPath projection
//! and deserializes the result into the `lazyaz-core` record shapes.

pub mod client;
pub mod config;
pub mod identity;
pub mod queries;
pub mod runner;
pub mod sources;

pub use client::DevOpsClient;
pub use config::{ConfigError, DevOpsConfig};
pub use identity::Identity;
pub use runner::{AzCli, CommandRunner};
pub use sources::{PipelineRunSource, PullRequestSource, WorkItemSource};
