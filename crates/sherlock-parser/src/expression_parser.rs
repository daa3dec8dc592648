//! Expression parser
//!
//! Parses condition strings into Expression AST nodes.
//!
//! Supported syntax:
//! - Column references: `df['cpu']`, `df["cpu"]`, bare `cpu`
//! - Numeric literals: `42`, `0.85`, `1e-3`
//! - Comparison operators: `>`, `<`, `>=`, `<=`, `==`, `!=`
//! - Arithmetic operators: `+`, `-`, `*`, `/`
//! - Logical operators: `and`, `or`, `not` and their symbolic forms `&`, `|`, `~`
//!   (`&&`, `||`, `!` are accepted too)
//! - Time-series postfix operators on columns: `.diff()`, `.rolling(N).mean()`,
//!   `.rolling(N).std()`
//! - Parentheses for grouping
//!
//! Anything else (function calls, attribute access, other methods) is
//! rejected. The grammar is closed: parsing never evaluates input text.

use crate::error::{ParseError, Result};
use crate::lexer::{tokenize, Token, TokenKind};
use log::trace;
use sherlock_core::ast::{Expression, Operator, TimeSeriesOp, UnaryOperator, DEFAULT_TABLE_ALIAS};

/// Hard cap on tokens per condition
const MAX_TOKENS: usize = 4096;

/// Hard cap on nested parentheses and prefix operators
const MAX_NESTING: usize = 64;

/// Hard cap on the depth of the resulting tree
const MAX_AST_DEPTH: usize = 512;

/// Largest accepted rolling window
const MAX_WINDOW: usize = 1_000_000;

/// Condition parser bound to a table alias
#[derive(Debug, Clone)]
pub struct ExpressionParser {
    table_alias: String,
}

impl Default for ExpressionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionParser {
    /// Create a parser using the default `df` table alias
    pub fn new() -> Self {
        ExpressionParser {
            table_alias: DEFAULT_TABLE_ALIAS.to_string(),
        }
    }

    /// Create a parser that resolves `<alias>['col']` references
    pub fn with_table_alias(alias: impl Into<String>) -> Self {
        ExpressionParser {
            table_alias: alias.into(),
        }
    }

    pub fn table_alias(&self) -> &str {
        &self.table_alias
    }

    /// Parse a condition string into an expression tree
    pub fn parse(&self, condition: &str) -> Result<Expression> {
        let tokens = tokenize(condition)?;
        if tokens.len() > MAX_TOKENS {
            return Err(ParseError::syntax(
                tokens[MAX_TOKENS].position,
                format!("condition exceeds {} tokens", MAX_TOKENS),
            ));
        }

        if tokens.len() == 1 {
            return Err(ParseError::syntax(0, "empty condition"));
        }

        let mut parser = Parser {
            input: condition,
            tokens,
            pos: 0,
            alias: &self.table_alias,
            nesting: 0,
        };
        let expression = parser.parse_or()?;
        parser.expect_end()?;

        if expression.depth() > MAX_AST_DEPTH {
            return Err(ParseError::syntax(0, "condition is nested too deeply"));
        }

        trace!("Parsed condition '{}' as {}", condition, expression);
        Ok(expression)
    }
}

/// Parse a condition with the default table alias
pub fn parse_condition(condition: &str) -> Result<Expression> {
    ExpressionParser::new().parse(condition)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    alias: &'a str,
    nesting: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        // tokenize() guarantees a trailing Eof, and advance() never moves past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Ident(name) if name == keyword)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token> {
        let token = self.peek().clone();
        if token.kind == kind {
            self.pos += 1;
            Ok(token)
        } else {
            Err(ParseError::syntax(
                token.position,
                format!("expected {}, found {}", what, token.kind),
            ))
        }
    }

    fn expect_end(&self) -> Result<()> {
        let token = self.peek();
        match token.kind {
            TokenKind::Eof => Ok(()),
            _ => Err(ParseError::syntax(
                token.position,
                format!("unexpected {} after complete condition", token.kind),
            )),
        }
    }

    fn enter(&mut self, position: usize) -> Result<()> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(ParseError::syntax(
                position,
                format!("nesting exceeds {} levels", MAX_NESTING),
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    /// or_expr := and_expr (("or" | "|") and_expr)*
    fn parse_or(&mut self) -> Result<Expression> {
        let mut left = self.parse_and()?;
        while self.peek().kind == TokenKind::Or || self.is_keyword("or") {
            self.advance();
            let right = self.parse_and()?;
            left = Expression::binary(left, Operator::Or, right);
        }
        Ok(left)
    }

    /// and_expr := not_expr (("and" | "&") not_expr)*
    fn parse_and(&mut self) -> Result<Expression> {
        let mut left = self.parse_not()?;
        while self.peek().kind == TokenKind::And || self.is_keyword("and") {
            self.advance();
            let right = self.parse_not()?;
            left = Expression::binary(left, Operator::And, right);
        }
        Ok(left)
    }

    /// not_expr := ("not" | "~") not_expr | comparison
    fn parse_not(&mut self) -> Result<Expression> {
        if self.peek().kind == TokenKind::Not || self.is_keyword("not") {
            let token = self.advance();
            self.enter(token.position)?;
            let operand = self.parse_not();
            self.leave();
            return Ok(Expression::unary(UnaryOperator::Not, operand?));
        }
        self.parse_comparison()
    }

    /// comparison := additive (cmp_op additive)?
    fn parse_comparison(&mut self) -> Result<Expression> {
        let left = self.parse_additive()?;
        let Some(op) = comparison_operator(&self.peek().kind) else {
            return Ok(left);
        };
        self.advance();
        let right = self.parse_additive()?;

        if comparison_operator(&self.peek().kind).is_some() {
            return Err(ParseError::syntax(
                self.peek().position,
                "chained comparisons are not supported, combine them with 'and'",
            ));
        }

        Ok(Expression::binary(left, op, right))
    }

    /// additive := multiplicative (("+" | "-") multiplicative)*
    fn parse_additive(&mut self) -> Result<Expression> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => Operator::Add,
                TokenKind::Minus => Operator::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expression::binary(left, op, right);
        }
        Ok(left)
    }

    /// multiplicative := unary (("*" | "/") unary)*
    fn parse_multiplicative(&mut self) -> Result<Expression> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => Operator::Mul,
                TokenKind::Slash => Operator::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expression::binary(left, op, right);
        }
        Ok(left)
    }

    /// unary := ("-" | "+") unary | postfix
    fn parse_unary(&mut self) -> Result<Expression> {
        match self.peek().kind {
            TokenKind::Minus => {
                let token = self.advance();
                self.enter(token.position)?;
                let operand = self.parse_unary();
                self.leave();
                Ok(match operand? {
                    Expression::Literal(value) => Expression::literal(-value),
                    other => Expression::unary(UnaryOperator::Negate, other),
                })
            }
            TokenKind::Plus => {
                let token = self.advance();
                self.enter(token.position)?;
                let operand = self.parse_unary();
                self.leave();
                operand
            }
            _ => self.parse_postfix(),
        }
    }

    /// postfix := atom ("." method)*
    fn parse_postfix(&mut self) -> Result<Expression> {
        let mut expression = self.parse_atom()?;

        while self.peek().kind == TokenKind::Dot {
            let dot = self.advance();
            if !matches!(expression, Expression::Column(_) | Expression::TimeSeries { .. }) {
                return Err(ParseError::syntax(
                    dot.position,
                    "time-series operators apply only to column references",
                ));
            }

            let method = self.advance();
            let TokenKind::Ident(name) = &method.kind else {
                return Err(ParseError::syntax(
                    method.position,
                    format!("expected method name after '.', found {}", method.kind),
                ));
            };

            let op = match name.as_str() {
                "diff" => {
                    self.expect_empty_call()?;
                    TimeSeriesOp::Diff
                }
                "rolling" => self.parse_rolling()?,
                other => {
                    return Err(ParseError::unknown_operator(
                        method.position,
                        format!("unsupported method '.{}()'", other),
                    ));
                }
            };
            expression = Expression::time_series(op, expression);
        }

        Ok(expression)
    }

    fn expect_empty_call(&mut self) -> Result<()> {
        self.expect(TokenKind::LParen, "'('")?;
        self.expect(TokenKind::RParen, "')'")?;
        Ok(())
    }

    /// rolling := "rolling" "(" window ")" "." ("mean" | "std") "(" ")"
    fn parse_rolling(&mut self) -> Result<TimeSeriesOp> {
        self.expect(TokenKind::LParen, "'('")?;
        let window = self.parse_window()?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Dot, "'.mean()' or '.std()' after rolling window")?;

        let aggregate = self.advance();
        let op = match &aggregate.kind {
            TokenKind::Ident(name) if name == "mean" => TimeSeriesOp::RollingMean { window },
            TokenKind::Ident(name) if name == "std" => TimeSeriesOp::RollingStd { window },
            TokenKind::Ident(name) => {
                return Err(ParseError::unknown_operator(
                    aggregate.position,
                    format!("unsupported rolling aggregate '.{}()'", name),
                ));
            }
            other => {
                return Err(ParseError::syntax(
                    aggregate.position,
                    format!("expected rolling aggregate, found {}", other),
                ));
            }
        };
        self.expect_empty_call()?;
        Ok(op)
    }

    fn parse_window(&mut self) -> Result<usize> {
        let token = self.advance();
        let TokenKind::Number(_) = token.kind else {
            return Err(ParseError::invalid_literal(
                token.position,
                format!("rolling window must be a positive integer, found {}", token.kind),
            ));
        };

        let text = &self.input[token.position..token.position + token.len];
        let window = text
            .bytes()
            .all(|b| b.is_ascii_digit())
            .then(|| text.parse::<usize>().ok())
            .flatten()
            .filter(|w| (1..=MAX_WINDOW).contains(w));

        window.ok_or_else(|| {
            ParseError::invalid_literal(
                token.position,
                format!("rolling window must be a positive integer, found '{}'", text),
            )
        })
    }

    /// atom := number | alias "[" (string | ident) "]" | ident | "(" or_expr ")"
    fn parse_atom(&mut self) -> Result<Expression> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(value) => Ok(Expression::literal(value)),
            TokenKind::LParen => {
                self.enter(token.position)?;
                let inner = self.parse_or();
                self.leave();
                let inner = inner?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Ident(ref name) if is_reserved(name) => Err(ParseError::syntax(
                token.position,
                format!("unexpected keyword '{}'", name),
            )),
            TokenKind::Ident(ref name) if name == self.alias => self.parse_column_index(&token),
            TokenKind::Ident(name) => {
                if self.peek().kind == TokenKind::LParen {
                    return Err(ParseError::unknown_operator(
                        token.position,
                        format!("function calls are not supported: '{}(...)'", name),
                    ));
                }
                Ok(Expression::column(name))
            }
            TokenKind::Str(_) => Err(ParseError::syntax(
                token.position,
                "string literals are only allowed as column names",
            )),
            TokenKind::Eof => Err(ParseError::syntax(
                token.position,
                "unexpected end of condition",
            )),
            other => Err(ParseError::syntax(
                token.position,
                format!("unexpected {}", other),
            )),
        }
    }

    fn parse_column_index(&mut self, alias: &Token) -> Result<Expression> {
        if self.peek().kind != TokenKind::LBracket {
            return Err(ParseError::syntax(
                self.peek().position,
                format!("expected '[' after table alias '{}'", self.alias),
            ));
        }
        self.advance();

        let key = self.advance();
        let name = match key.kind {
            TokenKind::Str(name) | TokenKind::Ident(name) => name,
            other => {
                return Err(ParseError::syntax(
                    key.position,
                    format!("expected column name, found {}", other),
                ));
            }
        };
        if name.trim().is_empty() {
            return Err(ParseError::syntax(alias.position, "empty column name"));
        }

        self.expect(TokenKind::RBracket, "']'")?;
        Ok(Expression::column(name))
    }
}

fn comparison_operator(kind: &TokenKind) -> Option<Operator> {
    match kind {
        TokenKind::Eq => Some(Operator::Eq),
        TokenKind::Ne => Some(Operator::Ne),
        TokenKind::Gt => Some(Operator::Gt),
        TokenKind::Ge => Some(Operator::Ge),
        TokenKind::Lt => Some(Operator::Lt),
        TokenKind::Le => Some(Operator::Le),
        _ => None,
    }
}

fn is_reserved(name: &str) -> bool {
    matches!(name, "and" | "or" | "not")
}
