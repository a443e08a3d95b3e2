use crate::error::SignalError;

/// Token types for the expression language
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Ident(String),

    // Arithmetic
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    Caret,      // ^
    DoubleStar, // **

    // Grouping and calls
    LeftParen,  // (
    RightParen, // )
    Comma,      // ,

    // Binding
    Equals, // =
}

impl Token {
    /// Human-readable form for diagnostics
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::Ident(name) => format!("'{}'", name),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Percent => "'%'".to_string(),
            Token::Caret => "'^'".to_string(),
            Token::DoubleStar => "'**'".to_string(),
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Equals => "'='".to_string(),
        }
    }
}

/// A token with its position in the source
#[derive(Debug, Clone)]
pub struct LocatedToken {
    pub token: Token,
    pub column: usize,
}

/// Lexer for tokenizing one statement of an expression.
///
/// Columns are 1-indexed and counted in characters from the start of the *whole*
/// expression text, so `column_offset` is the number of characters preceding this
/// statement.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_offset(input, 0)
    }

    pub fn with_offset(input: &'a str, column_offset: usize) -> Self {
        Self {
            chars: input.chars().peekable(),
            column: column_offset + 1,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.column += 1;
        Some(c)
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    pub fn tokenize(&mut self) -> Result<Vec<LocatedToken>, SignalError> {
        let mut tokens = Vec::new();

        while let Some(&c) = self.peek() {
            let column = self.column;

            if c.is_whitespace() {
                self.advance();
                continue;
            }

            let token = match c {
                '0'..='9' | '.' => self.lex_number(column)?,
                c if c.is_ascii_alphabetic() || c == '_' => self.lex_ident(),
                '+' => {
                    self.advance();
                    Token::Plus
                }
                '-' => {
                    self.advance();
                    Token::Minus
                }
                '*' => {
                    self.advance();
                    if let Some(&'*') = self.peek() {
                        self.advance();
                        Token::DoubleStar
                    } else {
                        Token::Star
                    }
                }
                '/' => {
                    self.advance();
                    Token::Slash
                }
                '%' => {
                    self.advance();
                    Token::Percent
                }
                '^' => {
                    self.advance();
                    Token::Caret
                }
                '(' => {
                    self.advance();
                    Token::LeftParen
                }
                ')' => {
                    self.advance();
                    Token::RightParen
                }
                ',' => {
                    self.advance();
                    Token::Comma
                }
                '=' => {
                    self.advance();
                    if let Some(&'=') = self.peek() {
                        return Err(SignalError::SyntaxError {
                            column,
                            message: "Comparison '==' is not supported".to_string(),
                        });
                    }
                    Token::Equals
                }
                other => {
                    return Err(SignalError::SyntaxError {
                        column,
                        message: format!("Unexpected character '{}'", other),
                    });
                }
            };

            tokens.push(LocatedToken { token, column });
        }

        Ok(tokens)
    }

    fn lex_ident(&mut self) -> Token {
        let mut name = String::new();
        while let Some(&c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        Token::Ident(name)
    }

    /// Decimal literal with optional fraction and exponent: `12`, `0.5`, `.5`, `4.`, `1e-3`
    fn lex_number(&mut self, column: usize) -> Result<Token, SignalError> {
        let mut text = String::new();
        let mut digits = 0;

        while let Some(&c) = self.peek() {
            if c.is_ascii_digit() {
                digits += 1;
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        if let Some(&'.') = self.peek() {
            text.push('.');
            self.advance();
            while let Some(&c) = self.peek() {
                if c.is_ascii_digit() {
                    digits += 1;
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        if digits == 0 {
            return Err(SignalError::SyntaxError {
                column,
                message: "Expected digits around '.'".to_string(),
            });
        }

        if let Some(&c) = self.peek() {
            if c == 'e' || c == 'E' {
                text.push('e');
                self.advance();
                if let Some(&sign) = self.peek() {
                    if sign == '+' || sign == '-' {
                        text.push(sign);
                        self.advance();
                    }
                }
                let mut exponent_digits = 0;
                while let Some(&c) = self.peek() {
                    if c.is_ascii_digit() {
                        exponent_digits += 1;
                        text.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
                if exponent_digits == 0 {
                    return Err(SignalError::SyntaxError {
                        column,
                        message: format!("Malformed exponent in number '{}'", text),
                    });
                }
            }
        }

        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|e| SignalError::SyntaxError {
                column,
                message: format!("Invalid number '{}': {}", text, e),
            })
    }
}
