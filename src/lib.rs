//! A small Unix shell: parses a command line into a list of command nodes
//! and runs it with pipes, file redirections, subshells, background jobs and
//! `;` / `&&` / `||` chaining. Builtins: `cd`, `our_pwd`, `exit`.

pub mod shell;
pub mod utils;

pub use shell::executor::{ExecError, Executor, Outcome};
pub use shell::parser::{ast, parse, ParseError};
