//! Argument formatting: turn a query's template into a concrete engine command.
//!
//! One entry point per family, plus `format_command` to dispatch on the
//! query's family. All of these are pure.

pub mod command;
pub mod families;
pub mod template;

pub use command::EngineCommand;
pub use families::format_command;
pub use template::{FormatError, Substitutions};
