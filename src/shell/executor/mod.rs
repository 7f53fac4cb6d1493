mod builtin;
mod error;
#[allow(clippy::module_inception)]
mod executor;
mod redirect;
mod spawn;
mod status;

pub use builtin::{parse_exit_code, BuiltinError};
pub use error::{abort_on, ExecError};
pub use executor::{Executor, Outcome};
pub use spawn::SUBSHELL_FAILURE;
