use std::iter::Peekable;
use std::str::Chars;

use super::ast::Stream;

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Word(String),
    Pipe,
    Or,
    And,
    Background,
    Semi,
    LParen,
    RParen,
    Redirect(Stream),
    /// A quote that was never closed, with the quote character.
    Unterminated(char),
    EOF,
}

pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.chars().peekable(),
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        match self.peek_char() {
            None => Token::EOF,
            Some(c) => match c {
                '|' => {
                    self.read_char();
                    if self.peek_char() == Some('|') {
                        self.read_char();
                        Token::Or
                    } else {
                        Token::Pipe
                    }
                }
                '&' => {
                    self.read_char();
                    if self.peek_char() == Some('&') {
                        self.read_char();
                        Token::And
                    } else {
                        Token::Background
                    }
                }
                ';' => {
                    self.read_char();
                    Token::Semi
                }
                '(' => {
                    self.read_char();
                    Token::LParen
                }
                ')' => {
                    self.read_char();
                    Token::RParen
                }
                '<' => {
                    self.read_char();
                    Token::Redirect(Stream::Input)
                }
                '>' => {
                    self.read_char();
                    Token::Redirect(Stream::Output)
                }
                _ => self.read_word(),
            },
        }
    }

    fn read_char(&mut self) -> Option<char> {
        self.input.next()
    }

    fn peek_char(&mut self) -> Option<char> {
        self.input.peek().copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if !c.is_whitespace() {
                break;
            }
            self.read_char();
        }
    }

    fn is_metachar(c: char) -> bool {
        c.is_whitespace() || ";<>|&()".contains(c)
    }

    // Quoted sections glue onto the surrounding bare text: a"b c"d is one word.
    fn read_word(&mut self) -> Token {
        let mut word = String::new();
        let mut at_start = true;

        while let Some(c) = self.peek_char() {
            if Self::is_metachar(c) {
                break;
            }
            match c {
                '"' | '\'' => {
                    if let Err(quote) = self.read_quoted_string(&mut word) {
                        return Token::Unterminated(quote);
                    }
                }
                '2' if at_start => {
                    self.read_char();
                    if self.peek_char() == Some('>') {
                        self.read_char();
                        return Token::Redirect(Stream::Error);
                    }
                    word.push(c);
                }
                _ => {
                    self.read_char();
                    word.push(c);
                }
            }
            at_start = false;
        }

        Token::Word(word)
    }

    // Err carries the quote character when input ends before it closes.
    fn read_quoted_string(&mut self, string: &mut String) -> Result<(), char> {
        let quote = self.read_char().unwrap_or_default();
        let mut escaped = false;

        while let Some(c) = self.read_char() {
            match (escaped, c) {
                (true, _) => {
                    string.push(c);
                    escaped = false;
                }
                (false, '\\') if quote == '"' => escaped = true,
                (false, c) if c == quote => return Ok(()),
                (false, c) => string.push(c),
            }
        }
        Err(quote)
    }
}
