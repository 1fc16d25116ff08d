//! Regular expressions over literal characters with grouping, alternation and the Kleene
//! star, compiled to an NFA by Thompson's construction.
//!
//! ```
//! use automata_toolkit::Regex;
//!
//! let re = Regex::new("(a|b)*c").unwrap();
//! assert!(re.is_match("aabbc"));
//! assert!(!re.is_match("aab"));
//! ```
use std::str::FromStr;

use crate::{simulate, Alphabet, Automaton};

pub use ast::{Ast, Expr};
pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use parser::Parser;

pub mod ast;
mod compiler;
mod error;
mod parser;


/// A compiled regular expression.
#[derive(Debug, Clone)]
pub struct Regex {
    pattern: String,
    ast: Ast,
    nfa: Automaton,
}

impl Regex {
    /// Parses `pattern` and compiles it into an NFA.
    pub fn new(pattern: &str) -> ParseResult<Self> {
        let ast = Parser::new(pattern)?.parse()?;
        let nfa = compiler::Compiler::compile(&ast);
        Ok(Self {
            pattern: pattern.to_string(),
            ast,
            nfa,
        })
    }

    /// Returns true iff the whole `input` belongs to the language of the expression.
    pub fn is_match(&self, input: &str) -> bool {
        simulate::accepts(&self.nfa, input)
    }

    /// The pattern this expression was created from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The parsed syntax tree.
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// The characters that occur as literals in the pattern.
    pub fn alphabet(&self) -> &Alphabet {
        self.nfa.alphabet()
    }

    /// The compiled NFA.
    pub fn nfa(&self) -> &Automaton {
        &self.nfa
    }

    /// Consumes `self` and returns the compiled NFA.
    pub fn into_nfa(self) -> Automaton {
        self.nfa
    }
}

impl FromStr for Regex {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Regex::new(s)
    }
}

/// Scans `pattern` for the characters it matches literally: every character that is not one
/// of the operators `(`, `)`, `*`, `|` and not a backslash contributes itself, an escaped
/// character contributes the escaped character. This does not require the pattern to be
/// well-formed, a trailing backslash is ignored.
pub fn alphabet_of(pattern: &str) -> Alphabet {
    let mut alphabet = Alphabet::literal(std::iter::empty());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    alphabet.insert(escaped);
                }
            }
            c if ast::is_operator(c) => {}
            c => {
                alphabet.insert(c);
            }
        }
    }
    alphabet
}
