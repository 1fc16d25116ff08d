//! Regex ast for the grammar
//!
//! ```ebnf
//!     expression ::= sub_expression (VERTICAL sub_expression)*;
//!     sub_expression ::= item+;
//!     item ::= (group | CHARACTER) STAR*;
//!     group ::= LEFT_PAREN expression RIGHT_PAREN;
//! ```
//!
//! `CHARACTER` is any character except the operators `(`, `)`, `|` and `*`, or any character
//! at all when it is preceded by a backslash.

use std::fmt::Display;

use crate::Alphabet;

/// A parsed regular expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ast(pub Expr);

/// Regular expression kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// The empty pattern, matching only the empty word. Only produced for an empty input.
    Empty,
    /// A single literal character.
    Literal(char),
    /// Concatenation of at least two expressions.
    Concat(Vec<Expr>),
    /// Alternatives (e.g., `<expression> | <expression> | ...`), at least two of them.
    Alternation(Vec<Expr>),
    /// Zero or more repetitions of the inner expression.
    Star(Box<Expr>),
}

impl Expr {
    fn collect_literals(&self, alphabet: &mut Alphabet) {
        match self {
            Expr::Empty => {}
            Expr::Literal(c) => {
                alphabet.insert(*c);
            }
            Expr::Concat(exprs) | Expr::Alternation(exprs) => {
                exprs.iter().for_each(|e| e.collect_literals(alphabet))
            }
            Expr::Star(inner) => inner.collect_literals(alphabet),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Alternation(_) => 0,
            Expr::Concat(_) => 1,
            Expr::Star(_) => 2,
            Expr::Empty | Expr::Literal(_) => 3,
        }
    }

    fn fmt_operand(&self, f: &mut std::fmt::Formatter<'_>, min: u8) -> std::fmt::Result {
        if self.precedence() < min {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl Ast {
    /// The set of characters that occur as literals in the expression.
    pub fn alphabet(&self) -> Alphabet {
        let mut alphabet = Alphabet::literal(std::iter::empty());
        self.0.collect_literals(&mut alphabet);
        alphabet
    }
}

/// Whether `c` has to be escaped to be read as a literal.
pub(crate) fn is_operator(c: char) -> bool {
    matches!(c, '(' | ')' | '*' | '|')
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Empty => Ok(()),
            Expr::Literal(c) if is_operator(*c) || *c == '\\' => write!(f, "\\{c}"),
            Expr::Literal(c) => write!(f, "{c}"),
            Expr::Concat(exprs) => exprs.iter().try_for_each(|e| e.fmt_operand(f, 2)),
            Expr::Alternation(exprs) => {
                for (i, e) in exprs.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    e.fmt_operand(f, 1)?;
                }
                Ok(())
            }
            Expr::Star(inner) => {
                inner.fmt_operand(f, 2)?;
                write!(f, "*")
            }
        }
    }
}

impl Display for Ast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
