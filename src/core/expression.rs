//! Cell formula tokenizer and parser
//!
//! Turns the formulas the renderer emits (`=F2-G2`, `=SUM(F2:F7)`,
//! `=E3/F3`) into an AST. Numbers are `f64` throughout so cent amounts
//! survive evaluation.

use crate::error::{TemplateError, TemplateResult};
use crate::excel::FormulaTranslator;
use std::iter::Peekable;
use std::str::Chars;

/// A token in a cell formula
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    /// Cell reference or function name
    Identifier(String),
    /// One of `+ - * / ^`
    Operator(char),
    OpenParen,
    CloseParen,
    Comma,
    Colon,
}

/// Zero-based grid position of an `A1`-style reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
}

impl CellRef {
    /// Parse `F2` into row 1, column 5
    pub fn parse(text: &str) -> Option<Self> {
        let split = text.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = text.split_at(split);
        if letters.is_empty() || letters.len() > 3 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let col = u16::try_from(FormulaTranslator::column_letter_to_index(letters)?).ok()?;
        let excel_row: u32 = digits.parse().ok()?;
        if excel_row == 0 {
            return None;
        }
        Some(Self {
            row: excel_row - 1,
            col,
        })
    }
}

/// Abstract syntax tree of a cell formula
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Cell(CellRef),
    /// Rectangular range, only valid as a function argument
    Range { start: CellRef, end: CellRef },
    FunctionCall { name: String, args: Vec<Expr> },
    BinaryOp {
        op: char,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Negate(Box<Expr>),
}

fn parse_error(formula: &str, message: impl std::fmt::Display) -> TemplateError {
    TemplateError::Eval(format!("Cannot parse formula '{}': {}", formula, message))
}

/// Tokenizer for cell formulas
pub struct Tokenizer<'a> {
    source: &'a str,
    chars: Peekable<Chars<'a>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        let body = source.strip_prefix('=').unwrap_or(source);
        Self {
            source,
            chars: body.chars().peekable(),
        }
    }

    pub fn tokenize(mut self) -> TemplateResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(c) = self.chars.peek().copied() {
            let token = match c {
                c if c.is_whitespace() => {
                    self.chars.next();
                    continue;
                }
                '(' => {
                    self.chars.next();
                    Token::OpenParen
                }
                ')' => {
                    self.chars.next();
                    Token::CloseParen
                }
                ',' => {
                    self.chars.next();
                    Token::Comma
                }
                ':' => {
                    self.chars.next();
                    Token::Colon
                }
                '+' | '-' | '*' | '/' | '^' => {
                    self.chars.next();
                    Token::Operator(c)
                }
                c if c.is_ascii_digit() || c == '.' => self.read_number()?,
                c if c.is_ascii_alphabetic() || c == '$' => self.read_identifier(),
                c => {
                    return Err(parse_error(
                        self.source,
                        format!("unexpected character '{}'", c),
                    ))
                }
            };
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn read_number(&mut self) -> TemplateResult<Token> {
        let mut text = String::new();
        while let Some(c) = self.chars.peek().copied() {
            if c.is_ascii_digit() || c == '.' {
                text.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        // Exponent, e.g. 1.5E+3
        if matches!(self.chars.peek(), Some('e') | Some('E')) {
            text.push('e');
            self.chars.next();
            if let Some(sign) = self.chars.peek().copied().filter(|c| *c == '+' || *c == '-') {
                text.push(sign);
                self.chars.next();
            }
            while let Some(c) = self.chars.peek().copied().filter(char::is_ascii_digit) {
                text.push(c);
                self.chars.next();
            }
        }
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| parse_error(self.source, format!("invalid number '{}'", text)))
    }

    fn read_identifier(&mut self) -> Token {
        let mut ident = String::new();
        while let Some(c) = self.chars.peek().copied() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                ident.push(c.to_ascii_uppercase());
                self.chars.next();
            } else if c == '$' {
                // Absolute markers do not change the referenced cell
                self.chars.next();
            } else {
                break;
            }
        }
        Token::Identifier(ident)
    }
}

/// Recursive descent parser with the usual arithmetic precedence
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            position: 0,
        }
    }

    pub fn parse(mut self) -> TemplateResult<Expr> {
        if self.tokens.is_empty() {
            return Err(parse_error(self.source, "empty expression"));
        }
        let expr = self.term()?;
        if let Some(token) = self.peek() {
            return Err(parse_error(
                self.source,
                format!("unexpected {:?} after expression", token),
            ));
        }
        Ok(expr)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn match_token(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn match_operator(&mut self, ops: &[char]) -> Option<char> {
        match self.peek() {
            Some(Token::Operator(op)) if ops.contains(op) => {
                let op = *op;
                self.position += 1;
                Some(op)
            }
            _ => None,
        }
    }

    /// Term: factor (( "+" | "-" ) factor)*
    fn term(&mut self) -> TemplateResult<Expr> {
        let mut left = self.factor()?;
        while let Some(op) = self.match_operator(&['+', '-']) {
            let right = self.factor()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// Factor: unary (( "*" | "/" ) unary)*
    fn factor(&mut self) -> TemplateResult<Expr> {
        let mut left = self.unary()?;
        while let Some(op) = self.match_operator(&['*', '/']) {
            let right = self.unary()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// Unary: ( "-" | "+" ) unary | power
    fn unary(&mut self) -> TemplateResult<Expr> {
        match self.match_operator(&['-', '+']) {
            Some('-') => Ok(Expr::Negate(Box::new(self.unary()?))),
            Some(_) => self.unary(),
            None => self.power(),
        }
    }

    /// Power: primary ( "^" unary )?
    fn power(&mut self) -> TemplateResult<Expr> {
        let base = self.primary()?;
        if self.match_operator(&['^']).is_some() {
            let exponent = self.unary()?;
            return Ok(Expr::BinaryOp {
                op: '^',
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn primary(&mut self) -> TemplateResult<Expr> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::OpenParen) => {
                let inner = self.term()?;
                if !self.match_token(&Token::CloseParen) {
                    return Err(parse_error(self.source, "expected ')'"));
                }
                Ok(inner)
            }
            Some(Token::Identifier(name)) => {
                if self.match_token(&Token::OpenParen) {
                    let args = self.arguments()?;
                    return Ok(Expr::FunctionCall { name, args });
                }
                let start = self.cell_ref(&name)?;
                if self.match_token(&Token::Colon) {
                    let end = match self.next() {
                        Some(Token::Identifier(end)) => self.cell_ref(&end)?,
                        other => {
                            return Err(parse_error(
                                self.source,
                                format!("expected range end, found {:?}", other),
                            ))
                        }
                    };
                    if end.row < start.row || end.col < start.col {
                        return Err(parse_error(
                            self.source,
                            format!("range {}:{} is reversed", name, self.source_ref(end)),
                        ));
                    }
                    return Ok(Expr::Range { start, end });
                }
                Ok(Expr::Cell(start))
            }
            other => Err(parse_error(
                self.source,
                format!("unexpected {:?}", other),
            )),
        }
    }

    /// Arguments after an opening parenthesis, through the closing one
    fn arguments(&mut self) -> TemplateResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.match_token(&Token::CloseParen) {
            return Ok(args);
        }
        loop {
            args.push(self.term()?);
            if self.match_token(&Token::Comma) {
                continue;
            }
            if self.match_token(&Token::CloseParen) {
                return Ok(args);
            }
            return Err(parse_error(self.source, "expected ',' or ')' in argument list"));
        }
    }

    fn cell_ref(&self, name: &str) -> TemplateResult<CellRef> {
        CellRef::parse(name)
            .ok_or_else(|| parse_error(self.source, format!("'{}' is not a cell reference", name)))
    }

    fn source_ref(&self, cell: CellRef) -> String {
        format!(
            "{}{}",
            FormulaTranslator::column_index_to_letter(cell.col as usize),
            cell.row + 1
        )
    }
}

/// Tokenize and parse a cell formula
pub fn parse(formula: &str) -> TemplateResult<Expr> {
    let tokens = Tokenizer::new(formula).tokenize()?;
    Parser::new(formula, tokens).parse()
}
