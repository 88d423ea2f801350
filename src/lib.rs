// Public API
pub mod cli;
pub mod commands;

// Core domain types
pub mod config;
pub mod distribute;
pub mod error;
pub mod installers;
pub mod layout;
pub mod libraries;
pub mod process;
pub mod scripts;
mod ui;
mod workspace;

// Re-export main types
pub use config::WorkspaceConfig;
pub use distribute::{distribute, module_list, DistributionReport};
pub use error::Error;
pub use layout::{Architecture, BuildConfig, BuildTarget};
pub use libraries::{LibraryDescriptor, LIBRARIES};
pub use process::{Invocation, ProcessOutput};
pub use scripts::ScriptInvoker;
pub use workspace::{Workspace, WorkspacePath};
