//! Configured actions that run against the selected record.
//!
//! Entries from `[extensions.<id>]` are resolved once at startup against a
//! static table of entry points. Resolution failures are skipped with a
//! warning. The dispatcher runs an entry point and turns its result into
//! an indicator and a status announcement.

pub mod builtin;
pub mod clipboard;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod template;

pub use dispatch::{ActionDispatcher, ActionOutcome, Indicator};
pub use error::ActionError;
pub use registry::{
    EntryPoint, EntryPointTable, ExtensionDescriptor, ExtensionRegistry, ExtensionSettings,
    normalize_id,
};
