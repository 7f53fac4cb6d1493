use log::debug;
use std::mem;

use crate::shell::parser::ast::{CommandList, ControlOp};

use super::error::ExecError;
use super::redirect::StageInput;
use super::spawn::spawn;
use super::status;

/// How a command list finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The list ran to its end or was cut short by `&&` / `||`.
    Completed(i32),
    /// An `exit` builtin asked the invoking shell to terminate.
    Exit(i32),
}

impl Outcome {
    pub fn code(self) -> i32 {
        match self {
            Outcome::Completed(code) | Outcome::Exit(code) => code,
        }
    }
}

/// Walks a command list, starting each node and applying its operator.
pub struct Executor {
    depth: usize,
}

impl Executor {
    pub fn new() -> Self {
        Self { depth: 0 }
    }

    /// Executor for a subshell body running `depth` levels down.
    pub fn nested(depth: usize) -> Self {
        Self { depth }
    }

    /// Runs every node allowed by the chaining rules and returns the status
    /// of the last one waited on (0 when that node ran in the background or
    /// fed a pipe). `exit` comes back as [`Outcome::Exit`] instead of ending
    /// the process here.
    pub fn run(&mut self, list: &CommandList) -> Result<Outcome, ExecError> {
        let mut last_status = 0;
        let mut pending = StageInput::Stdin;

        for (cmd, op) in list.nodes() {
            let spawned = spawn(cmd, op, mem::take(&mut pending), self.depth)?;
            pending = spawned.next;

            last_status = if op.waits() {
                status::wait_for(spawned.pid)
            } else {
                0
            };
            debug!("[{}] `{}` -> {}", self.depth, cmd, last_status);

            if let Some(code) = spawned.terminate {
                debug!("[{}] exit requested with {}", self.depth, code);
                return Ok(Outcome::Exit(code));
            }

            match op {
                ControlOp::And if last_status != 0 => break,
                ControlOp::Or if last_status == 0 => break,
                _ => {}
            }
        }

        drop(pending);
        let reaped = status::reap_finished();
        if reaped > 0 {
            debug!("[{}] reaped {} finished children", self.depth, reaped);
        }
        Ok(Outcome::Completed(last_status))
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}
