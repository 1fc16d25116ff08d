use std::{collections::BTreeSet, fmt::Display};

use itertools::Itertools;

/// The character used to denote an epsilon transition in textual descriptions of automata.
pub const EPSILON: char = '$';

/// Labels an edge of an [`crate::Automaton`]. An edge either consumes a single
/// [`Label::Symbol`] or is an [`Label::Epsilon`] edge, which can be taken without
/// consuming any input.
///
/// Keeping epsilon as its own variant means that no `char` has to be sacrificed for it,
/// a regular expression may well contain a literal `$`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    /// A real symbol of the alphabet.
    Symbol(char),
    /// Moves without consuming input.
    Epsilon,
}

impl Label {
    /// Parses a label from its textual form, where `$` stands for epsilon.
    pub fn from_token(token: char) -> Self {
        if token == EPSILON {
            Label::Epsilon
        } else {
            Label::Symbol(token)
        }
    }

    /// Returns true iff `self` is an epsilon label.
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Label::Epsilon)
    }
}

impl From<char> for Label {
    fn from(value: char) -> Self {
        Label::Symbol(value)
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Symbol(c) => write!(f, "{c}"),
            Label::Epsilon => write!(f, "{EPSILON}"),
        }
    }
}

/// A finite, ordered set of symbols. Epsilon is a [`Label`] and never a symbol, so a `$`
/// in an alphabet built by [`Alphabet::literal`] is an ordinary character.
///
/// Iteration always happens in ascending order, which makes every algorithm that
/// walks the alphabet deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Alphabet(BTreeSet<char>);

impl Alphabet {
    /// Creates an alphabet from the given symbols, dropping the epsilon marker `$` if present.
    pub fn new<I: IntoIterator<Item = char>>(symbols: I) -> Self {
        Self(symbols.into_iter().filter(|c| *c != EPSILON).collect())
    }

    /// Creates an alphabet that contains exactly the given symbols, including a `$`.
    /// This is used for alphabets inferred from regular expressions, where `$` is an
    /// ordinary character.
    pub fn literal<I: IntoIterator<Item = char>>(symbols: I) -> Self {
        Self(symbols.into_iter().collect())
    }

    /// Returns true if `symbol` belongs to the alphabet.
    pub fn contains(&self, symbol: char) -> bool {
        self.0.contains(&symbol)
    }

    /// Checks whether an edge may carry `label`: epsilon is always admissible, a symbol
    /// only if it is in the alphabet.
    pub fn admits(&self, label: Label) -> bool {
        match label {
            Label::Symbol(c) => self.contains(c),
            Label::Epsilon => true,
        }
    }

    /// Adds a symbol, returns true if it was not present before.
    pub fn insert(&mut self, symbol: char) -> bool {
        self.0.insert(symbol)
    }

    /// Iterates over the symbols in ascending order.
    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().copied()
    }

    /// The number of symbols.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true iff the alphabet has no symbols.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<char> for Alphabet {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        Alphabet::new(iter)
    }
}

impl Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.0.iter().join(", "))
    }
}
