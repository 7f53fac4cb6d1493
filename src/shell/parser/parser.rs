use thiserror::Error;

use super::ast::{Command, CommandList, ControlOp, Stream};
use super::lexer::{Lexer, Token};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected {0}")]
    Unexpected(String),
    #[error("expected filename after {0}")]
    MissingTarget(&'static str),
    #[error("missing ')'")]
    Unclosed,
    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),
    #[error("empty command before {0}")]
    EmptyCommand(String),
}

fn describe(token: &Token) -> String {
    match token {
        Token::Word(word) => format!("word '{}'", word),
        Token::Pipe => "'|'".to_string(),
        Token::Or => "'||'".to_string(),
        Token::And => "'&&'".to_string(),
        Token::Background => "'&'".to_string(),
        Token::Semi => "';'".to_string(),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
        Token::Redirect(stream) => format!("'{}'", redirect_symbol(*stream)),
        Token::Unterminated(quote) => format!("unterminated {}", quote),
        Token::EOF => "end of line".to_string(),
    }
}

fn redirect_symbol(stream: Stream) -> &'static str {
    match stream {
        Stream::Input => "<",
        Stream::Output => ">",
        Stream::Error => "2>",
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token();
        Parser {
            lexer,
            current_token,
        }
    }

    fn next_token(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token();
        self.check_token()
    }

    fn check_token(&self) -> Result<(), ParseError> {
        match self.current_token {
            Token::Unterminated(quote) => Err(ParseError::UnterminatedQuote(quote)),
            _ => Ok(()),
        }
    }

    /// Parses the whole line into a command list.
    pub fn parse(&mut self) -> Result<CommandList, ParseError> {
        self.check_token()?;
        let list = self.parse_list()?;
        match &self.current_token {
            Token::EOF => Ok(list),
            token => Err(ParseError::Unexpected(describe(token))),
        }
    }

    // Stops at EOF or at a ')' closing the enclosing subshell.
    fn parse_list(&mut self) -> Result<CommandList, ParseError> {
        let mut commands: Vec<Command> = Vec::new();

        while !matches!(self.current_token, Token::EOF | Token::RParen) {
            let mut command = self.parse_command()?;

            let op = match self.current_token {
                Token::Semi => Some(ControlOp::Semicolon),
                Token::And => Some(ControlOp::And),
                Token::Or => Some(ControlOp::Or),
                Token::Background => Some(ControlOp::Background),
                Token::Pipe => Some(ControlOp::Pipe),
                _ => None,
            };
            let Some(op) = op else {
                commands.push(command);
                break;
            };
            let op_token = describe(&self.current_token);
            self.next_token()?;
            command.op = op;
            commands.push(command);

            if matches!(self.current_token, Token::EOF | Token::RParen) {
                // `;` and `&` may close a list, the binary operators need a right side.
                if !matches!(op, ControlOp::Semicolon | ControlOp::Background) {
                    return Err(ParseError::EmptyCommand(describe(&self.current_token)));
                }
                break;
            }
            if matches!(
                self.current_token,
                Token::Semi | Token::And | Token::Or | Token::Background | Token::Pipe
            ) {
                return Err(ParseError::EmptyCommand(op_token_after(
                    &op_token,
                    &self.current_token,
                )));
            }
        }

        Ok(CommandList::new(commands))
    }

    fn parse_command(&mut self) -> Result<Command, ParseError> {
        let mut command = Command::default();

        if self.current_token == Token::LParen {
            self.next_token()?;
            let body = self.parse_list()?;
            if self.current_token != Token::RParen {
                return Err(ParseError::Unclosed);
            }
            if body.is_empty() {
                return Err(ParseError::EmptyCommand(describe(&self.current_token)));
            }
            self.next_token()?;
            command.subshell = Some(body);
        }

        loop {
            match &self.current_token {
                Token::Redirect(stream) => {
                    let stream = *stream;
                    self.next_token()?;
                    match &self.current_token {
                        Token::Word(filename) if !filename.is_empty() => {
                            command.redirections.set(stream, filename.clone());
                            self.next_token()?;
                        }
                        _ => return Err(ParseError::MissingTarget(redirect_symbol(stream))),
                    }
                }
                Token::Word(word) if command.subshell.is_none() => {
                    command.argv.push(word.clone());
                    self.next_token()?;
                }
                Token::Word(_) | Token::LParen => {
                    return Err(ParseError::Unexpected(describe(&self.current_token)))
                }
                _ => break,
            }
        }

        if command.is_null() && command.redirections.is_empty() {
            return Err(ParseError::EmptyCommand(describe(&self.current_token)));
        }
        Ok(command)
    }
}

fn op_token_after(first: &str, second: &Token) -> String {
    format!("{} after {}", describe(second), first)
}

/// Parses one input line.
pub fn parse(line: &str) -> Result<CommandList, ParseError> {
    Parser::new(line).parse()
}
