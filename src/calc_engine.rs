use std::fmt;

use crate::format::format_number;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    UnexpectedChar(char),
    UnexpectedEnd,
    Expected { expected: char, found: Option<char> },
    TooDeep,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Character offset into the expression.
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    Parse(ParseError),
    NumericFormat { literal: String, position: usize },
}

impl EvalError {
    /// The character the evaluator stopped at, if it stopped at one.
    pub fn offending_char(&self) -> Option<char> {
        match self {
            EvalError::Parse(ParseError { kind: ParseErrorKind::UnexpectedChar(c), .. }) => Some(*c),
            EvalError::Parse(ParseError { kind: ParseErrorKind::Expected { found, .. }, .. }) => *found,
            _ => None,
        }
    }

    pub fn position(&self) -> usize {
        match self {
            EvalError::Parse(e) => e.position,
            EvalError::NumericFormat { position, .. } => *position,
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::UnexpectedChar(c) => write!(f, "Unexpected: '{}'", c),
            ParseErrorKind::UnexpectedEnd => write!(f, "Unexpected end of input"),
            ParseErrorKind::Expected { expected, found: Some(c) } => {
                write!(f, "Expected '{}' but found '{}'", expected, c)
            }
            ParseErrorKind::Expected { expected, found: None } => {
                write!(f, "Expected '{}' but reached end of input", expected)
            }
            ParseErrorKind::TooDeep => {
                write!(f, "Expression nested deeper than {} levels", MAX_NESTING)
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.kind, self.position)
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Parse(e) => write!(f, "Parse error: {}", e),
            EvalError::NumericFormat { literal, position } => {
                write!(f, "Invalid number: '{}' at position {}", literal, position)
            }
        }
    }
}

impl std::error::Error for EvalError {}

impl From<ParseError> for EvalError {
    fn from(e: ParseError) -> Self {
        EvalError::Parse(e)
    }
}

/// Deepest allowed nesting of parentheses, unary signs and exponents.
pub const MAX_NESTING: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub operation: String,
    pub result: f64,
}

pub struct EvaluationTrace {
    pub steps: Vec<Step>,
    pub detailed_mode: bool,
}

impl EvaluationTrace {
    pub fn new(detailed_mode: bool) -> Self {
        EvaluationTrace {
            steps: Vec::new(),
            detailed_mode,
        }
    }

    pub fn add_step(&mut self, operation: impl FnOnce() -> String, result: f64) {
        if self.detailed_mode {
            self.steps.push(Step { operation: operation(), result });
        }
    }
}

/// Evaluates a single arithmetic expression.
///
/// Supports `+ - * / %`, `^` and its alias `**` (right-associative), unary
/// signs and parentheses. Unary signs bind tighter than exponentiation, so
/// `-2^2` is `4`. Division and remainder by zero follow IEEE-754.
pub fn evaluate(expression: &str) -> Result<f64, EvalError> {
    evaluate_traced(expression, &mut EvaluationTrace::new(false))
}

pub fn evaluate_traced(expression: &str, trace: &mut EvaluationTrace) -> Result<f64, EvalError> {
    Parser::new(expression).parse(trace)
}

/// Scan position over the expression. `current() == None` is end of input.
struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(expression: &str) -> Self {
        Cursor {
            chars: expression.chars().collect(),
            pos: 0,
        }
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn lookahead(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) {
        if self.pos < self.chars.len() {
            self.pos += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while self.current().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.current() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    // A lone `*` is multiplication, `**` is never split.
    fn eat_multiply(&mut self) -> bool {
        self.skip_whitespace();
        if self.current() == Some('*') && self.lookahead() != Some('*') {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_power(&mut self) -> bool {
        self.skip_whitespace();
        match (self.current(), self.lookahead()) {
            (Some('^'), _) => {
                self.advance();
                true
            }
            (Some('*'), Some('*')) => {
                self.advance();
                self.advance();
                true
            }
            _ => false,
        }
    }
}

struct Parser {
    cursor: Cursor,
    depth: usize,
}

impl Parser {
    fn new(expression: &str) -> Self {
        Parser { cursor: Cursor::new(expression), depth: 0 }
    }

    // Every recursive production goes through here so nesting cannot exhaust the stack.
    fn descend(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(self.error(ParseErrorKind::TooDeep));
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    fn error(&self, kind: ParseErrorKind) -> EvalError {
        EvalError::Parse(ParseError { kind, position: self.cursor.pos })
    }

    fn parse(&mut self, trace: &mut EvaluationTrace) -> Result<f64, EvalError> {
        let result = self.expression(trace)?;
        self.cursor.skip_whitespace();
        match self.cursor.current() {
            None => Ok(result),
            Some(c) => Err(self.error(ParseErrorKind::UnexpectedChar(c))),
        }
    }

    fn expression(&mut self, trace: &mut EvaluationTrace) -> Result<f64, EvalError> {
        let mut left = self.term(trace)?;

        loop {
            if self.cursor.eat('+') {
                let right = self.term(trace)?;
                let before = left;
                left += right;
                trace.add_step(|| binary(before, "+", right), left);
            } else if self.cursor.eat('-') {
                let right = self.term(trace)?;
                let before = left;
                left -= right;
                trace.add_step(|| binary(before, "-", right), left);
            } else {
                return Ok(left);
            }
        }
    }

    fn term(&mut self, trace: &mut EvaluationTrace) -> Result<f64, EvalError> {
        let mut left = self.factor(trace)?;

        loop {
            let (op, right) = if self.cursor.eat_multiply() {
                ("*", self.factor(trace)?)
            } else if self.cursor.eat('/') {
                ("/", self.factor(trace)?)
            } else if self.cursor.eat('%') {
                ("%", self.factor(trace)?)
            } else {
                return Ok(left);
            };

            let before = left;
            left = match op {
                "*" => left * right,
                "/" => left / right,
                _ => left % right,
            };
            trace.add_step(|| binary(before, op, right), left);
        }
    }

    // Exponent recurses into `factor`, making `^` right-associative.
    fn factor(&mut self, trace: &mut EvaluationTrace) -> Result<f64, EvalError> {
        let base = self.signed(trace)?;

        if self.cursor.eat_power() {
            self.descend()?;
            let exponent = self.factor(trace)?;
            self.ascend();
            let result = base.powf(exponent);
            trace.add_step(|| binary(base, "^", exponent), result);
            Ok(result)
        } else {
            Ok(base)
        }
    }

    fn signed(&mut self, trace: &mut EvaluationTrace) -> Result<f64, EvalError> {
        if self.cursor.eat('+') {
            self.descend()?;
            let operand = self.signed(trace)?;
            self.ascend();
            return Ok(operand);
        }
        if self.cursor.eat('-') {
            self.descend()?;
            let operand = self.signed(trace)?;
            self.ascend();
            let result = -operand;
            trace.add_step(|| format!("-{}", format_number(operand)), result);
            return Ok(result);
        }
        self.atom(trace)
    }

    fn atom(&mut self, trace: &mut EvaluationTrace) -> Result<f64, EvalError> {
        if self.cursor.eat('(') {
            self.descend()?;
            let inner = self.expression(trace)?;
            self.ascend();
            if !self.cursor.eat(')') {
                let found = self.cursor.current();
                return Err(self.error(ParseErrorKind::Expected { expected: ')', found }));
            }
            return Ok(inner);
        }

        match self.cursor.current() {
            Some(c) if is_number_char(c) => self.number(),
            Some(c) => Err(self.error(ParseErrorKind::UnexpectedChar(c))),
            None => Err(self.error(ParseErrorKind::UnexpectedEnd)),
        }
    }

    fn number(&mut self) -> Result<f64, EvalError> {
        let position = self.cursor.pos;
        let mut literal = String::new();
        while let Some(c) = self.cursor.current().filter(|c| is_number_char(*c)) {
            literal.push(c);
            self.cursor.advance();
        }

        literal
            .parse::<f64>()
            .map_err(|_| EvalError::NumericFormat { literal, position })
    }
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

fn binary(left: f64, op: &str, right: f64) -> String {
    format!("{} {} {}", format_number(left), op, format_number(right))
}
