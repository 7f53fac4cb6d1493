use log::error;
use nix::errno::Errno;
use thiserror::Error;

/// Kernel-level failures while building a pipeline. Half-built plumbing
/// cannot be unwound, so callers treat these as fatal.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ExecError {
    #[error("pipe: {}", reason(.0))]
    Pipe(Errno),
    #[error("fork: {}", reason(.0))]
    Fork(Errno),
}

/// The C library's wording for `errno`, as strerror(3) gives it.
pub fn reason(e: &Errno) -> errno::Errno {
    errno::Errno(*e as i32)
}

/// Writes `tag: reason` to standard error, like perror(3).
pub fn report(tag: &str, errno: Errno) {
    eprintln!("{}: {}", tag, reason(&errno));
}

/// Reports a fatal executor error and aborts the process.
pub fn abort_on(err: &ExecError) -> ! {
    error!("fatal executor error: {:?}", err);
    eprintln!("pipesh: {}", err);
    std::process::abort()
}
