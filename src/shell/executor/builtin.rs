use std::io::Write;

use log::debug;
use nix::unistd;
use thiserror::Error;

use super::error::report;

/// Argument-count violations. The Display text is the exact diagnostic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuiltinError {
    #[error("{0}: Syntax error! Wrong number of arguments!")]
    WrongArgCount(&'static str),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Builtin<'a> {
    Cd(&'a str),
    Pwd,
    Exit(i32),
}

/// What a command node resolves to before anything runs.
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch<'a> {
    Null,
    Builtin(Result<Builtin<'a>, BuiltinError>),
    External(&'a [String]),
}

impl<'a> Dispatch<'a> {
    pub fn classify(argv: &'a [String]) -> Self {
        let Some((name, args)) = argv.split_first() else {
            return Dispatch::Null;
        };
        let builtin = match name.as_str() {
            "cd" => match args {
                [dir] => Ok(Builtin::Cd(dir.as_str())),
                _ => Err(BuiltinError::WrongArgCount("cd")),
            },
            "our_pwd" => match args {
                [] => Ok(Builtin::Pwd),
                _ => Err(BuiltinError::WrongArgCount("pwd")),
            },
            "exit" => match args {
                [] => Ok(Builtin::Exit(0)),
                [code] => Ok(Builtin::Exit(parse_exit_code(code))),
                _ => Err(BuiltinError::WrongArgCount("exit")),
            },
            _ => return Dispatch::External(argv),
        };
        Dispatch::Builtin(builtin)
    }
}

/// Which side of the fork is running the builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    /// The forked child; its exit status is the command's status.
    Child,
    /// The shell itself, where `cd` and `exit` must take effect.
    Parent,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    Status(i32),
    Terminate(i32),
    Proceed,
}

impl Builtin<'_> {
    pub fn run(&self, ctx: Context) -> Effect {
        match (self, ctx) {
            (Builtin::Cd(dir), Context::Child) => match unistd::chdir(*dir) {
                Ok(()) => Effect::Status(0),
                Err(e) => {
                    report("cd", e);
                    Effect::Status(1)
                }
            },
            (Builtin::Cd(dir), Context::Parent) => {
                // The child already reported the failure through its status.
                if let Err(e) = unistd::chdir(*dir) {
                    debug!("cd {} ignored in shell: {}", dir, e);
                }
                Effect::Proceed
            }
            (Builtin::Pwd, Context::Child) => match unistd::getcwd() {
                Ok(cwd) => {
                    let mut stdout = std::io::stdout().lock();
                    match writeln!(stdout, "{}", cwd.display()).and_then(|_| stdout.flush()) {
                        Ok(()) => Effect::Status(0),
                        Err(e) => {
                            eprintln!("pwd: {}", e);
                            Effect::Status(1)
                        }
                    }
                }
                Err(e) => {
                    report("pwd", e);
                    Effect::Status(1)
                }
            },
            (Builtin::Pwd, Context::Parent) => Effect::Proceed,
            (Builtin::Exit(code), Context::Child) => Effect::Status(*code),
            (Builtin::Exit(code), Context::Parent) => Effect::Terminate(*code),
        }
    }
}

/// Lenient integer parse in the manner of atoi(3): leading whitespace, an
/// optional sign, then the longest run of digits. Anything else yields 0.
pub fn parse_exit_code(text: &str) -> i32 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let mut value: i32 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.wrapping_mul(10).wrapping_add(i32::from(b - b'0'));
    }
    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}
