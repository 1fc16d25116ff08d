//! Toolkit for working with finite automata over `char` symbols.
//!
//! The crate compiles regular expressions into nondeterministic finite automata
//! ([`regex`]), decides acceptance of words by an NFA ([`simulate`]), turns an NFA into
//! an equivalent deterministic automaton via subset construction ([`determinize`]) and
//! reduces a DFA by refining equivalence classes of states ([`minimize`]). All of these
//! operate on the shared [`Automaton`] model.
#![warn(missing_docs)]

mod alphabet;
pub use alphabet::{Alphabet, Label, EPSILON};

mod automaton;
pub use automaton::{Automaton, AutomatonError, StateId};

pub mod determinize;
pub mod minimize;
pub mod problem;
pub mod regex;
pub mod simulate;

pub use determinize::{determinize, Determinized};
pub use minimize::{minimize, MinimizeConfig, Partition};
pub use regex::Regex;
pub use simulate::accepts;

/// Type alias for sets, we use this to hide which type of `HashSet` we are actually using.
#[cfg(feature = "ahash")]
pub type Set<S> = ahash::HashSet<S>;
/// Type alias for sets, we use this to hide which type of `HashSet` we are actually using.
#[cfg(not(feature = "ahash"))]
pub type Set<S> = std::collections::HashSet<S>;

/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
#[cfg(feature = "ahash")]
pub type Map<K, V> = ahash::HashMap<K, V>;
/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
#[cfg(not(feature = "ahash"))]
pub type Map<K, V> = std::collections::HashMap<K, V>;

/// Commonly used imports.
pub mod prelude {
    pub use super::{
        accepts, determinize, minimize, Alphabet, Automaton, AutomatonError, Label,
        MinimizeConfig, Regex, StateId,
    };
}
