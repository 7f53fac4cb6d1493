pub mod executor;
pub mod parser;
mod readline;
#[allow(clippy::module_inception)]
mod shell;

pub use shell::{Shell, SYNTAX_ERROR_STATUS};
