//! Recursive-descent parser.
//!
//! ```text
//! query    := or_expr EOF
//! or_expr  := and_expr ( "OR" and_expr )*
//! and_expr := unary ( "AND"? unary )*
//! unary    := "NOT" unary | primary
//! primary  := "(" or_expr ")" | WORD | PHRASE | FIELD
//! ```

use super::expr::Expr;
use super::field::FieldSelector;
use super::lexer::{FieldValue, Token, TokenKind, tokenize};
use super::pattern::Pattern;
use crate::error::{QueryError, QueryErrorKind};

/// Deepest tree, and deepest `NOT`/`(` nesting, a query may have.
pub const MAX_DEPTH: usize = 256;

/// Parse query text. `Ok(None)` means the query was blank.
pub fn parse(input: &str) -> Result<Option<Expr>, QueryError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Ok(None);
    }

    let mut parser = Parser { tokens, pos: 0, depth: 0, nesting: 0, end: input.len() };
    let (expr, _) = parser.or_expr()?;

    if let Some(token) = parser.peek() {
        // Only an unmatched ')' can stop the top-level loop early.
        return Err(QueryError::new(QueryErrorKind::UnexpectedCloseParen, token.start));
    }

    Ok(Some(expr))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Open parentheses.
    depth: usize,
    /// Open parentheses plus pending `NOT`s.
    nesting: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Height of a new node over children of `height`.
    fn grow(height: usize, position: usize) -> Result<usize, QueryError> {
        if height >= MAX_DEPTH {
            return Err(QueryError::new(QueryErrorKind::TooDeep, position));
        }
        Ok(height + 1)
    }

    fn enter(&mut self, position: usize) -> Result<(), QueryError> {
        if self.nesting >= MAX_DEPTH {
            return Err(QueryError::new(QueryErrorKind::TooDeep, position));
        }
        self.nesting += 1;
        Ok(())
    }

    // Each rule returns the expression and its tree height.

    fn or_expr(&mut self) -> Result<(Expr, usize), QueryError> {
        let (mut lhs, mut height) = self.and_expr()?;
        while let Some(start) = self.peek().filter(|t| t.kind == TokenKind::Or).map(|t| t.start) {
            self.next();
            let (rhs, rhs_height) = self.and_expr()?;
            height = Self::grow(height.max(rhs_height), start)?;
            lhs = Expr::or(lhs, rhs);
        }
        Ok((lhs, height))
    }

    fn and_expr(&mut self) -> Result<(Expr, usize), QueryError> {
        let (mut lhs, mut height) = self.unary()?;
        loop {
            let start = self.peek().map_or(self.end, |t| t.start);
            match self.peek().map(|t| &t.kind) {
                Some(TokenKind::And) => {
                    self.next();
                }
                Some(
                    TokenKind::Not
                    | TokenKind::LParen
                    | TokenKind::Word(_)
                    | TokenKind::Phrase(_)
                    | TokenKind::Field { .. },
                ) => {}
                _ => break,
            }
            let (rhs, rhs_height) = self.unary()?;
            height = Self::grow(height.max(rhs_height), start)?;
            lhs = Expr::and(lhs, rhs);
        }
        Ok((lhs, height))
    }

    fn unary(&mut self) -> Result<(Expr, usize), QueryError> {
        if let Some(start) = self.peek().filter(|t| t.kind == TokenKind::Not).map(|t| t.start) {
            self.enter(start)?;
            self.next();
            let (inner, height) = self.unary()?;
            self.nesting -= 1;
            return Ok((Expr::negate(inner), Self::grow(height, start)?));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<(Expr, usize), QueryError> {
        let Some(token) = self.next() else {
            return Err(QueryError::new(QueryErrorKind::MissingOperand, self.end));
        };

        match token.kind {
            TokenKind::LParen => {
                if self.peek().is_some_and(|t| t.kind == TokenKind::RParen) {
                    return Err(QueryError::new(QueryErrorKind::EmptyGroup, token.start));
                }
                self.enter(token.start)?;
                self.depth += 1;
                let inner = self.or_expr()?;
                self.depth -= 1;
                self.nesting -= 1;
                match self.next() {
                    Some(Token { kind: TokenKind::RParen, .. }) => Ok(inner),
                    _ => Err(QueryError::new(QueryErrorKind::UnclosedParen, token.start)),
                }
            }
            TokenKind::RParen if self.depth == 0 => {
                Err(QueryError::new(QueryErrorKind::UnexpectedCloseParen, token.start))
            }
            // NOT never reaches here; unary() consumes it.
            TokenKind::RParen | TokenKind::And | TokenKind::Or | TokenKind::Not => {
                Err(QueryError::new(QueryErrorKind::MissingOperand, token.start))
            }
            TokenKind::Word(word) => Ok((Expr::Term(word_pattern(&word, token.start)?), 1)),
            TokenKind::Phrase(text) => {
                if text.is_empty() {
                    return Err(QueryError::new(QueryErrorKind::EmptyPhrase, token.start));
                }
                Ok((Expr::Phrase(text.to_lowercase()), 1))
            }
            TokenKind::Field { name, value } => {
                let pattern = match value {
                    FieldValue::Word(word) => word_pattern(&word, token.start)?,
                    FieldValue::Phrase(text) if text.is_empty() => {
                        return Err(QueryError::new(QueryErrorKind::EmptyPhrase, token.start));
                    }
                    FieldValue::Phrase(text) => Pattern::phrase(&text),
                };
                Ok((Expr::FieldTerm { field: FieldSelector::resolve(&name), pattern }, 1))
            }
        }
    }
}

fn word_pattern(word: &str, start: usize) -> Result<Pattern, QueryError> {
    Pattern::word(word).map_err(|e| {
        tracing::debug!(word, error = %e, "Wildcard term rejected");
        QueryError::new(QueryErrorKind::InvalidWildcard, start)
    })
}
