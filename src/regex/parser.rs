//! Regex recursive descent parser, see [`super::ast`] for the grammar.

use std::{iter::Peekable, vec::IntoIter};

use tracing::trace;

use super::{
    ast::{Ast, Expr},
    error::{ParseError, ParseErrorKind, ParseResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Char(char),
    LeftParen,
    RightParen,
    Vertical,
    Star,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: TokenKind,
    pos: usize,
}

/// Splits the pattern into tokens, resolving backslash escapes.
fn tokenize(input: &str) -> ParseResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().enumerate();

    while let Some((pos, c)) = chars.next() {
        let kind = match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => TokenKind::Char(escaped),
                None => return Err(ParseError::new(ParseErrorKind::DanglingEscape, pos)),
            },
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '|' => TokenKind::Vertical,
            '*' => TokenKind::Star,
            c => TokenKind::Char(c),
        };
        tokens.push(Token { kind, pos });
    }

    Ok(tokens)
}

/// Recursive descent regex parser.
pub struct Parser {
    /// Stream of tokens being parsed.
    tokens: Peekable<IntoIter<Token>>,
    /// Length of the pattern in characters, used as position once the tokens run out.
    end: usize,
}

impl Parser {
    /// Creates a new regex parser from the `input`.
    pub fn new(input: &str) -> ParseResult<Self> {
        Ok(Self {
            tokens: tokenize(input)?.into_iter().peekable(),
            end: input.chars().count(),
        })
    }

    /// Parses the `input` into a regex [`Ast`]. The empty pattern yields [`Expr::Empty`].
    pub fn parse(mut self) -> ParseResult<Ast> {
        if self.tokens.peek().is_none() {
            return Ok(Ast(Expr::Empty));
        }

        let expr = self.expression(false)?;

        match self.tokens.next() {
            None => {
                trace!("parsed regex {expr}");
                Ok(Ast(expr))
            }
            Some(Token { pos, .. }) => {
                Err(ParseError::new(ParseErrorKind::UnmatchedRightParen, pos))
            }
        }
    }

    /// Rule: `expression ::= sub_expression (VERTICAL sub_expression)*`
    fn expression(&mut self, in_group: bool) -> ParseResult<Expr> {
        let mut alternatives = Vec::new();

        loop {
            let pos = self.position();
            let mut items = self.sub_expression()?;
            let more = self.peek_kind() == Some(TokenKind::Vertical);

            if items.is_empty() {
                let kind = if more || !alternatives.is_empty() {
                    ParseErrorKind::EmptyAlternative
                } else if in_group {
                    ParseErrorKind::EmptyGroup
                } else {
                    ParseErrorKind::UnmatchedRightParen
                };
                return Err(ParseError::new(kind, pos));
            }

            alternatives.push(if items.len() == 1 {
                items.remove(0)
            } else {
                Expr::Concat(items)
            });

            if !more {
                break;
            }
            self.tokens.next();
        }

        Ok(if alternatives.len() == 1 {
            alternatives.remove(0)
        } else {
            Expr::Alternation(alternatives)
        })
    }

    /// Rule: `sub_expression ::= item+`
    ///
    /// Returns an empty vector if there is no item, the caller knows which error that is.
    fn sub_expression(&mut self) -> ParseResult<Vec<Expr>> {
        let mut items = Vec::new();
        while !matches!(
            self.peek_kind(),
            Some(TokenKind::Vertical | TokenKind::RightParen) | None
        ) {
            items.push(self.item()?);
        }
        Ok(items)
    }

    /// Rule: `item ::= (group | CHARACTER) STAR*`
    fn item(&mut self) -> ParseResult<Expr> {
        let Some(token) = self.tokens.next() else {
            return Err(ParseError::new(ParseErrorKind::UnclosedGroup, self.end));
        };

        let mut expr = match token.kind {
            TokenKind::Char(c) => Expr::Literal(c),
            TokenKind::LeftParen => self.group(token.pos)?,
            TokenKind::Star => {
                return Err(ParseError::new(ParseErrorKind::NothingToRepeat, token.pos))
            }
            TokenKind::Vertical | TokenKind::RightParen => {
                unreachable!("sub expressions stop at VERTICAL and RIGHT_PAREN")
            }
        };

        while self.peek_kind() == Some(TokenKind::Star) {
            self.tokens.next();
            expr = Expr::Star(Box::new(expr));
        }

        Ok(expr)
    }

    /// Rule: `group ::= LEFT_PAREN expression RIGHT_PAREN`, called after LEFT_PAREN was
    /// consumed at `open`.
    fn group(&mut self, open: usize) -> ParseResult<Expr> {
        if self.peek_kind().is_none() {
            return Err(ParseError::new(ParseErrorKind::UnclosedGroup, open));
        }

        let expr = self.expression(true)?;

        match self.tokens.next() {
            Some(Token {
                kind: TokenKind::RightParen,
                ..
            }) => Ok(expr),
            _ => Err(ParseError::new(ParseErrorKind::UnclosedGroup, open)),
        }
    }

    fn peek_kind(&mut self) -> Option<TokenKind> {
        self.tokens.peek().map(|t| t.kind)
    }

    /// Returns the position of the current token.
    fn position(&mut self) -> usize {
        self.tokens.peek().map(|t| t.pos).unwrap_or(self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::Parser;
    use crate::regex::{
        ast::Expr::{self, *},
        error::{ParseError, ParseErrorKind},
    };
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Result<Expr, ParseError> {
        Parser::new(input).and_then(|p| p.parse()).map(|ast| ast.0)
    }

    fn err(input: &str) -> (ParseErrorKind, usize) {
        let e = parse(input).unwrap_err();
        (e.kind, e.pos)
    }

    fn lit(c: char) -> Expr {
        Literal(c)
    }

    #[test]
    fn precedence() {
        assert_eq!(
            parse("ab|c*").unwrap(),
            Alternation(vec![
                Concat(vec![lit('a'), lit('b')]),
                Star(Box::new(lit('c')))
            ])
        );
        assert_eq!(
            parse("(a|b)*c").unwrap(),
            Concat(vec![
                Star(Box::new(Alternation(vec![lit('a'), lit('b')]))),
                lit('c')
            ])
        );
        assert_eq!(parse("a|b|c").unwrap(), Alternation(vec![lit('a'), lit('b'), lit('c')]));
        assert_eq!(parse("").unwrap(), Empty);
    }

    #[test]
    fn escapes() {
        assert_eq!(
            parse(r"\(\*\|\\").unwrap(),
            Concat(vec![lit('('), lit('*'), lit('|'), lit('\\')])
        );
        assert_eq!(parse(r"\a*").unwrap(), Star(Box::new(lit('a'))));
        assert_eq!(parse("a**").unwrap(), Star(Box::new(Star(Box::new(lit('a'))))));
    }

    #[test]
    fn malformed() {
        use ParseErrorKind::*;
        assert_eq!(err("()"), (EmptyGroup, 1));
        assert_eq!(err("a|"), (EmptyAlternative, 2));
        assert_eq!(err("|a"), (EmptyAlternative, 0));
        assert_eq!(err("a||b"), (EmptyAlternative, 2));
        assert_eq!(err("(a|)"), (EmptyAlternative, 3));
        assert_eq!(err("*a"), (NothingToRepeat, 0));
        assert_eq!(err("(*)"), (NothingToRepeat, 1));
        assert_eq!(err("a|*"), (NothingToRepeat, 2));
        assert_eq!(err("(ab"), (UnclosedGroup, 0));
        assert_eq!(err("a(b(c)"), (UnclosedGroup, 1));
        assert_eq!(err("("), (UnclosedGroup, 0));
        assert_eq!(err("ab)"), (UnmatchedRightParen, 2));
        assert_eq!(err(")"), (UnmatchedRightParen, 0));
        assert_eq!(err(r"ab\"), (DanglingEscape, 2));
    }
}
