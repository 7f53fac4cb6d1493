use std::ffi::CString;
use std::io::{self, Write};

use log::debug;
use nix::errno::Errno;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::unistd::{self, fork, ForkResult, Pid};

use super::builtin::{Context, Dispatch, Effect};
use super::error::{abort_on, report, ExecError};
use super::executor::{Executor, Outcome};
use super::redirect::{self, Pipe, StageInput, WiringError};
use crate::shell::parser::ast::{Command, ControlOp};

/// Status a subshell reports when its body did not finish with 0.
pub const SUBSHELL_FAILURE: i32 = 5;

/// A started command, as seen by the shell.
#[derive(Debug)]
pub struct Spawned {
    pub pid: Pid,
    /// Input for the next node: this command's pipe, or stdin.
    pub next: StageInput,
    /// Set when the command asks the shell itself to exit.
    pub terminate: Option<i32>,
}

/// Starts one command and returns without waiting for it.
///
/// `input` is consumed: the child installs it as stdin and the shell closes
/// its copy. When `op` is `Pipe` a fresh pipe is created, the child writes
/// into it and its read end comes back in [`Spawned::next`].
pub fn spawn(
    cmd: &Command,
    op: ControlOp,
    input: StageInput,
    depth: usize,
) -> Result<Spawned, ExecError> {
    let pipe = match op {
        ControlOp::Pipe => Some(Pipe::new().map_err(ExecError::Pipe)?),
        _ => None,
    };
    let dispatch = Dispatch::classify(&cmd.argv);

    // Anything still buffered would be written by both processes.
    let _ = io::stdout().flush();

    // SAFETY: the shell is single-threaded; the child only rewires
    // descriptors and then execs or exits.
    match unsafe { fork() }.map_err(ExecError::Fork)? {
        ForkResult::Child => run_child(cmd, &dispatch, input, pipe, depth),
        ForkResult::Parent { child } => {
            debug!("[{}] spawned {} for `{}` ({:?})", depth, child, cmd, op);

            let terminate = match &dispatch {
                Dispatch::Builtin(Ok(builtin)) => match builtin.run(Context::Parent) {
                    Effect::Terminate(code) => Some(code),
                    Effect::Status(_) | Effect::Proceed => None,
                },
                _ => None,
            };

            let next = match pipe {
                Some(Pipe { read, write }) => {
                    drop(write);
                    StageInput::Pipe(read)
                }
                None => StageInput::Stdin,
            };
            drop(input);

            Ok(Spawned {
                pid: child,
                next,
                terminate,
            })
        }
    }
}

fn run_child(
    cmd: &Command,
    dispatch: &Dispatch,
    input: StageInput,
    pipe: Option<Pipe>,
    depth: usize,
) -> ! {
    // The Rust runtime ignores SIGPIPE and that disposition survives exec.
    // SAFETY: restoring the default handler installs no Rust code.
    if let Err(e) = unsafe { signal::signal(Signal::SIGPIPE, SigHandler::SigDfl) } {
        debug!("cannot restore SIGPIPE: {}", e);
    }

    let status = match redirect::wire_child(input, pipe, &cmd.redirections) {
        Ok(()) => run_body(cmd, dispatch, depth),
        Err(WiringError { tag, errno }) => {
            report(&tag, errno);
            1
        }
    };
    let _ = io::stdout().flush();
    // SAFETY: _exit(2) skips the parent's atexit handlers and stdio buffers,
    // which the forked child must not run.
    unsafe { libc::_exit(status) }
}

fn run_body(cmd: &Command, dispatch: &Dispatch, depth: usize) -> i32 {
    if let Some(body) = &cmd.subshell {
        return match Executor::nested(depth + 1).run(body) {
            Ok(Outcome::Completed(0)) => 0,
            Ok(Outcome::Completed(_)) => SUBSHELL_FAILURE,
            Ok(Outcome::Exit(code)) => code,
            Err(e) => abort_on(&e),
        };
    }

    match dispatch {
        Dispatch::Null => 0,
        Dispatch::Builtin(Err(e)) => {
            eprintln!("{}", e);
            1
        }
        Dispatch::Builtin(Ok(builtin)) => match builtin.run(Context::Child) {
            Effect::Status(code) | Effect::Terminate(code) => code,
            Effect::Proceed => 0,
        },
        Dispatch::External(argv) => exec_external(argv),
    }
}

/// Replaces the child image; only returns a status when exec fails.
fn exec_external(argv: &[String]) -> i32 {
    let Some(program) = argv.first() else {
        return 0;
    };
    let args = match argv
        .iter()
        .map(|arg| CString::new(arg.as_bytes()))
        .collect::<Result<Vec<CString>, _>>()
    {
        Ok(args) => args,
        Err(_) => {
            report(program, Errno::EINVAL);
            return 1;
        }
    };
    let Some(file) = args.first() else {
        return 0;
    };

    let errno = match unistd::execvp(file, &args) {
        Ok(never) => match never {},
        Err(e) => e,
    };
    report(program, errno);
    1
}
