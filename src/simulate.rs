//! Deciding whether an automaton accepts a word.
//!
//! The search explores configurations `(position, state)`: from a configuration the simulator
//! either consumes the next input symbol along a matching edge or follows an epsilon edge
//! without consuming anything. A configuration is never explored twice. Since the position is
//! part of the configuration, this is exactly the guard against running around an epsilon
//! cycle forever, while a state may be entered again once a symbol has been consumed.
use tracing::trace;

use crate::{Automaton, Label, Set, StateId};

/// Returns true iff `nfa` accepts `input`, i.e. there is a path from the start state that
/// spells `input` (epsilon edges spell nothing) and ends in an accepting state.
///
/// An automaton without start state accepts nothing. Characters outside the alphabet have no
/// transitions, so words containing them are rejected.
pub fn accepts(nfa: &Automaton, input: &str) -> bool {
    Simulator::new(nfa, input).run()
}

/// Explicit work-list version of a backtracking NFA run.
pub struct Simulator<'a> {
    nfa: &'a Automaton,
    input: Vec<char>,
    stack: Vec<(usize, StateId)>,
    seen: Set<(usize, StateId)>,
}

impl<'a> Simulator<'a> {
    /// Prepares a run of `nfa` on `input`.
    pub fn new(nfa: &'a Automaton, input: &str) -> Self {
        let mut simulator = Self {
            nfa,
            input: input.chars().collect(),
            stack: Vec::new(),
            seen: Set::default(),
        };
        if let Some(start) = nfa.start() {
            simulator.push(0, start);
        }
        simulator
    }

    fn push(&mut self, position: usize, state: StateId) {
        if self.seen.insert((position, state)) {
            self.stack.push((position, state));
        }
    }

    /// Runs the search to completion, returning whether an accepting configuration at the end
    /// of the input is reachable.
    pub fn run(mut self) -> bool {
        while let Some((position, state)) = self.stack.pop() {
            trace!(
                "at {:?} with {} symbols consumed",
                self.nfa.name(state),
                position
            );

            if position == self.input.len() && self.nfa.is_accepting(state) {
                trace!("accepting");
                return true;
            }

            // Pushed in reverse so that symbol edges are tried before epsilon edges and
            // targets in ascending order.
            for target in self.nfa.transitions(state, Label::Epsilon).iter().rev() {
                self.push(position, *target);
            }
            if let Some(&symbol) = self.input.get(position) {
                for target in self.nfa.transitions(state, symbol).iter().rev() {
                    self.push(position + 1, *target);
                }
            }
        }
        trace!("all branches exhausted, rejecting");
        false
    }

    /// The number of distinct configurations explored so far.
    pub fn explored(&self) -> usize {
        self.seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{accepts, Simulator};
    use crate::{Alphabet, Automaton, Label};

    fn two_states() -> Automaton {
        let mut nfa = Automaton::new(Alphabet::new("a".chars()));
        let q0 = nfa.add_state("q0", false).unwrap();
        let q1 = nfa.add_state("q1", true).unwrap();
        nfa.add_transition(q0, 'a', q1).unwrap();
        nfa
    }

    #[test]
    fn single_transition() {
        let nfa = two_states();
        assert!(accepts(&nfa, "a"));
        assert!(!accepts(&nfa, "aa"));
        assert!(!accepts(&nfa, ""));
        assert!(!accepts(&nfa, "b"));
    }

    #[test]
    fn deterministic_results() {
        let nfa = two_states();
        let first = accepts(&nfa, "a");
        for _ in 0..10 {
            assert_eq!(accepts(&nfa, "a"), first);
        }
    }

    #[test]
    fn epsilon_cycles_terminate() {
        let mut nfa = Automaton::new(Alphabet::new("ab".chars()));
        let p = nfa.add_state("p", false).unwrap();
        let q = nfa.add_state("q", false).unwrap();
        let r = nfa.add_state("r", true).unwrap();
        nfa.add_transition(p, Label::Epsilon, q).unwrap();
        nfa.add_transition(q, Label::Epsilon, p).unwrap();
        nfa.add_transition(q, 'a', p).unwrap();
        nfa.add_transition(p, 'b', r).unwrap();

        assert!(accepts(&nfa, "b"));
        assert!(accepts(&nfa, "aab"));
        assert!(!accepts(&nfa, "aa"));
        assert!(!accepts(&nfa, ""));
    }

    #[test]
    fn states_can_be_revisited_after_consuming() {
        let mut nfa = Automaton::new(Alphabet::new("a".chars()));
        let p = nfa.add_state("p", false).unwrap();
        let q = nfa.add_state("q", true).unwrap();
        nfa.add_transition(p, Label::Epsilon, q).unwrap();
        nfa.add_transition(q, 'a', p).unwrap();
        assert!(accepts(&nfa, "aaaa"));
    }

    #[test]
    fn without_start_nothing_is_accepted() {
        let nfa = Automaton::new(Alphabet::new("a".chars()));
        assert!(!accepts(&nfa, ""));
        let sim = Simulator::new(&nfa, "a");
        assert_eq!(sim.explored(), 0);
    }
}
