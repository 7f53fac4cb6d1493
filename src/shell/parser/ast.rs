use std::fmt;
use std::os::fd::RawFd;

/// Relationship between a command and the one that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlOp {
    #[default]
    End,
    Semicolon,
    And,
    Or,
    Background,
    Pipe,
}

impl ControlOp {
    /// Whether the driver blocks on a command carrying this operator.
    pub fn waits(self) -> bool {
        !matches!(self, ControlOp::Background | ControlOp::Pipe)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Input,
    Output,
    Error,
}

impl Stream {
    pub const ALL: [Stream; 3] = [Stream::Input, Stream::Output, Stream::Error];

    pub fn fd(self) -> RawFd {
        match self {
            Stream::Input => libc::STDIN_FILENO,
            Stream::Output => libc::STDOUT_FILENO,
            Stream::Error => libc::STDERR_FILENO,
        }
    }

    fn index(self) -> usize {
        match self {
            Stream::Input => 0,
            Stream::Output => 1,
            Stream::Error => 2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redirections {
    targets: [Option<String>; 3],
}

impl Redirections {
    pub fn set(&mut self, stream: Stream, filename: String) {
        self.targets[stream.index()] = Some(filename);
    }

    pub fn get(&self, stream: Stream) -> Option<&str> {
        self.targets[stream.index()].as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.iter().all(Option::is_none)
    }

    /// Targets in stdin, stdout, stderr order.
    pub fn iter(&self) -> impl Iterator<Item = (Stream, &str)> {
        Stream::ALL
            .into_iter()
            .filter_map(move |stream| self.get(stream).map(|target| (stream, target)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    pub argv: Vec<String>,
    pub redirections: Redirections,
    pub op: ControlOp,
    pub subshell: Option<CommandList>,
}

impl Command {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn subshell(body: CommandList) -> Self {
        Self {
            subshell: Some(body),
            ..Self::default()
        }
    }

    pub fn with_op(mut self, op: ControlOp) -> Self {
        self.op = op;
        self
    }

    pub fn with_redirect(mut self, stream: Stream, filename: impl Into<String>) -> Self {
        self.redirections.set(stream, filename.into());
        self
    }

    pub fn is_null(&self) -> bool {
        self.argv.is_empty() && self.subshell.is_none()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subshell {
            Some(body) => write!(f, "( {} )", body)?,
            None => write!(f, "{}", shell_words::join(&self.argv))?,
        }
        for (stream, target) in self.redirections.iter() {
            let op = match stream {
                Stream::Input => "<",
                Stream::Output => ">",
                Stream::Error => "2>",
            };
            write!(f, " {} {}", op, shell_words::quote(target))?;
        }
        Ok(())
    }
}

/// Ordered command nodes, each linked to the next by its `op`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandList {
    commands: Vec<Command>,
}

impl CommandList {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Nodes paired with the operator the driver acts on. A pipe hanging off
    /// the last node has nothing to feed and behaves as END.
    pub fn nodes(&self) -> impl Iterator<Item = (&Command, ControlOp)> {
        let last = self.commands.len().saturating_sub(1);
        self.commands.iter().enumerate().map(move |(i, cmd)| {
            let op = match cmd.op {
                ControlOp::Pipe if i == last => ControlOp::End,
                op => op,
            };
            (cmd, op)
        })
    }
}

impl fmt::Display for CommandList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cmd) in self.commands.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", cmd)?;
            let op = match cmd.op {
                ControlOp::End => "",
                ControlOp::Semicolon => " ;",
                ControlOp::And => " &&",
                ControlOp::Or => " ||",
                ControlOp::Background => " &",
                ControlOp::Pipe => " |",
            };
            f.write_str(op)?;
        }
        Ok(())
    }
}
