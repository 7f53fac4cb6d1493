use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};

use nix::errno::Errno;
use nix::fcntl::{self, FcntlArg, FdFlag, OFlag};
use nix::sys::stat::Mode;
use nix::unistd;

use crate::shell::parser::ast::{Redirections, Stream};

/// Where the next stage reads its standard input from. The pipe variant owns
/// the read end, so dropping it closes the descriptor.
#[derive(Debug, Default)]
pub enum StageInput {
    #[default]
    Stdin,
    Pipe(OwnedFd),
}

pub struct Pipe {
    pub read: OwnedFd,
    pub write: OwnedFd,
}

impl Pipe {
    pub fn new() -> nix::Result<Self> {
        let (read, write) = unistd::pipe()?;
        Ok(Self { read, write })
    }
}

/// Moves `fd` onto `target` and closes the original.
pub fn install(fd: OwnedFd, target: RawFd) -> nix::Result<()> {
    if fd.as_raw_fd() == target {
        // Already in place: keep it open across exec instead of closing it.
        let fd = fd.into_raw_fd();
        fcntl::fcntl(fd, FcntlArg::F_SETFD(FdFlag::empty()))?;
        return Ok(());
    }
    unistd::dup2(fd.as_raw_fd(), target)?;
    Ok(())
}

/// Opens a redirection target with the flags its stream calls for.
pub fn open_target(stream: Stream, path: &str) -> nix::Result<OwnedFd> {
    let flags = match stream {
        Stream::Input => OFlag::O_RDONLY,
        Stream::Output | Stream::Error => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
    };
    let mode = Mode::from_bits_truncate(0o666);
    let fd = fcntl::open(path, flags | OFlag::O_CLOEXEC, mode)?;
    // SAFETY: open(2) just returned this descriptor and nothing else owns it.
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

/// A redirection that could not be applied, tagged with what failed.
#[derive(Debug)]
pub struct WiringError {
    pub tag: String,
    pub errno: Errno,
}

/// Child-side plumbing: previous pipe onto stdin, own pipe onto stdout, then
/// the file redirections on top. Every descriptor taken here is either
/// installed or closed before returning, on success and on error.
pub fn wire_child(
    input: StageInput,
    pipe: Option<Pipe>,
    redirections: &Redirections,
) -> Result<(), WiringError> {
    let fail = |tag: &str| {
        let tag = tag.to_string();
        move |errno: Errno| WiringError { tag, errno }
    };

    if let StageInput::Pipe(fd) = input {
        install(fd, libc::STDIN_FILENO).map_err(fail("dup2"))?;
    }
    if let Some(Pipe { read, write }) = pipe {
        drop(read);
        install(write, libc::STDOUT_FILENO).map_err(fail("dup2"))?;
    }
    for (stream, target) in redirections.iter() {
        let fd = open_target(stream, target).map_err(fail(target))?;
        install(fd, stream.fd()).map_err(fail(target))?;
    }
    Ok(())
}
