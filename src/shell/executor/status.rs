use log::{debug, error};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

/// Status used for chaining when a child did not exit normally.
pub const ABNORMAL_STATUS: i32 = 1;

/// Folds a wait result into the 0-255 status the driver chains on.
pub fn exit_code(ws: WaitStatus) -> i32 {
    match ws {
        WaitStatus::Exited(_, status) => status,
        WaitStatus::Signaled(pid, sig, _core_dumped) => {
            debug!("pid {} killed by {:?}", pid, sig);
            ABNORMAL_STATUS
        }
        other => {
            debug!("unexpected wait status {:?}", other);
            ABNORMAL_STATUS
        }
    }
}

/// Blocks until `pid` terminates and returns its status.
pub fn wait_for(pid: Pid) -> i32 {
    loop {
        match waitpid(pid, None) {
            Ok(ws) => return exit_code(ws),
            Err(Errno::EINTR) => continue,
            Err(e) => {
                error!("waitpid {} failed: {}", pid, e);
                return ABNORMAL_STATUS;
            }
        }
    }
}

/// Collects every child that has already finished, without blocking.
/// Returns how many were reaped.
pub fn reap_finished() -> usize {
    let mut reaped = 0;
    loop {
        match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(_) => break,
            Ok(ws) => {
                debug!("reaped background child: {:?}", ws);
                reaped += 1;
            }
        }
    }
    reaped
}
