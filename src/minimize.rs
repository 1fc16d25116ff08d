//! Reducing a DFA by refining equivalence classes of states.
//!
//! The refinement starts from the split into non-accepting and accepting states. In each
//! round, every class is split further: scanning the class in order, each member that is not
//! yet placed becomes the representative of a new sub-class, which absorbs every later member
//! that moves into the same class as the representative on every symbol. A pair where either
//! side has no transition on some symbol is never merged.
use itertools::Itertools;
use tracing::{debug, trace};

use crate::{determinize::canonical_label, Automaton, AutomatonError, Map, StateId};

/// Controls how many refinement rounds [`minimize`] performs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinimizeConfig {
    /// Stop after this many rounds even if the last round still split a class. Without a
    /// limit, refinement runs until a round splits nothing.
    pub max_rounds: Option<usize>,
}

impl MinimizeConfig {
    /// The number of rounds used by [`MinimizeConfig::three_rounds`].
    pub const FIXED_ROUNDS: usize = 3;

    /// Refine until nothing changes.
    pub fn fixpoint() -> Self {
        Self { max_rounds: None }
    }

    /// Refine for at most `rounds` rounds.
    pub fn with_max_rounds(rounds: usize) -> Self {
        Self {
            max_rounds: Some(rounds),
        }
    }

    /// Stops after three rounds, which may under-split automata that need more rounds to
    /// converge.
    pub fn three_rounds() -> Self {
        Self::with_max_rounds(Self::FIXED_ROUNDS)
    }
}

/// A partition of the states of a DFA into classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition(Vec<Vec<StateId>>);

impl Partition {
    /// Creates a partition from the given classes, empty classes are dropped.
    pub fn new<I, C>(classes: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = StateId>,
    {
        Self(
            classes
                .into_iter()
                .map(|c| c.into_iter().collect_vec())
                .filter(|c| !c.is_empty())
                .collect(),
        )
    }

    /// The split into non-accepting and accepting states.
    pub fn initial(dfa: &Automaton) -> Self {
        Self::new([
            dfa.rejecting_states().collect_vec(),
            dfa.accepting_states().collect_vec(),
        ])
    }

    /// The number of classes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true iff there are no classes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the classes.
    pub fn classes(&self) -> impl Iterator<Item = &[StateId]> + '_ {
        self.0.iter().map(|c| c.as_slice())
    }

    /// Returns the index of the class containing `state`.
    pub fn class_of(&self, state: StateId) -> Option<usize> {
        self.0.iter().position(|c| c.contains(&state))
    }

    fn index(&self) -> Map<StateId, usize> {
        self.0
            .iter()
            .enumerate()
            .flat_map(|(i, class)| class.iter().map(move |q| (*q, i)))
            .collect()
    }

    /// Performs a single refinement round.
    pub fn refine(&self, dfa: &Automaton) -> Partition {
        let index = self.index();
        let symbols = dfa.alphabet().symbols().collect_vec();

        let consistent = |p: StateId, q: StateId| {
            symbols.iter().all(
                |&symbol| match (dfa.successor(p, symbol), dfa.successor(q, symbol)) {
                    (Some(x), Some(y)) => match (index.get(&x), index.get(&y)) {
                        (Some(i), Some(j)) => i == j,
                        _ => false,
                    },
                    _ => false,
                },
            )
        };

        let mut classes = Vec::with_capacity(self.len());
        for class in &self.0 {
            let mut placed = vec![false; class.len()];
            for i in 0..class.len() {
                if placed[i] {
                    continue;
                }
                placed[i] = true;
                let representative = class[i];
                let mut sub_class = vec![representative];
                for j in (i + 1)..class.len() {
                    if !placed[j] && consistent(representative, class[j]) {
                        placed[j] = true;
                        sub_class.push(class[j]);
                    }
                }
                classes.push(sub_class);
            }
        }
        Partition(classes)
    }

    /// Builds the quotient automaton, which has one state per class. A class is named by the
    /// canonical label of its members, with `'` appended while that name is taken, since
    /// member names may contain `-` themselves. Every class takes its transitions from its
    /// first member, so the result is only language-equivalent when the partition is stable.
    pub fn quotient(&self, dfa: &Automaton) -> Automaton {
        let mut quotient = Automaton::new(dfa.alphabet().clone());
        let index = self.index();

        let ids = self
            .0
            .iter()
            .map(|class| {
                let mut name = canonical_label(class.iter().filter_map(|q| dfa.name(*q)));
                while quotient.state_id(&name).is_some() {
                    name.push('\'');
                }
                let accepting = class.iter().any(|q| dfa.is_accepting(*q));
                quotient
                    .add_state(name, accepting)
                    .expect("name was checked to be free")
            })
            .collect_vec();

        for (class, source) in self.0.iter().zip(&ids) {
            let representative = class[0];
            for symbol in dfa.alphabet().symbols() {
                if let Some(target) = dfa
                    .successor(representative, symbol)
                    .and_then(|t| index.get(&t))
                {
                    quotient
                        .set_transition(*source, symbol, ids[*target])
                        .expect("quotient states and symbols are valid");
                }
            }
        }

        if let Some(start) = dfa.start().and_then(|q| index.get(&q)) {
            quotient
                .set_start(ids[*start])
                .expect("quotient states exist");
        }

        quotient
    }
}

/// Refines the equivalence classes of the states of `dfa` as configured and returns the
/// resulting partition, whose number of classes approximates the size of the minimal DFA from
/// above. Fails if `dfa` is not deterministic.
pub fn minimize(dfa: &Automaton, config: &MinimizeConfig) -> Result<Partition, AutomatonError> {
    dfa.check_deterministic()?;

    // A stable partition is always reached after at most as many rounds as there are states.
    let limit = config.max_rounds.unwrap_or(dfa.size());
    let mut partition = Partition::initial(dfa);
    trace!("initial partition has {} classes", partition.len());

    for round in 1..=limit {
        let refined = partition.refine(dfa);
        let split = refined.len() != partition.len();
        partition = refined;
        trace!("after round {} there are {} classes", round, partition.len());
        if !split {
            debug!("partition is stable after {} rounds", round);
            break;
        }
    }

    debug!(
        "reduced DFA with {} states to {} classes",
        dfa.size(),
        partition.len()
    );
    Ok(partition)
}

#[cfg(test)]
mod tests {
    use super::{minimize, MinimizeConfig, Partition};
    use crate::{simulate::accepts, Alphabet, Automaton, AutomatonError, Label};
    use pretty_assertions::assert_eq;

    fn dfa(states: &[(&str, bool)], transitions: &[(&str, char, &str)]) -> Automaton {
        let symbols = transitions.iter().map(|(_, s, _)| *s);
        let mut dfa = Automaton::new(Alphabet::new(symbols));
        for (name, accepting) in states {
            dfa.add_state(*name, *accepting).unwrap();
        }
        for (from, symbol, to) in transitions {
            let from = dfa.state_id(from).unwrap();
            let to = dfa.state_id(to).unwrap();
            dfa.set_transition(from, *symbol, to).unwrap();
        }
        dfa
    }

    /// The example from <https://en.wikipedia.org/wiki/DFA_minimization>.
    fn wiki_dfa() -> Automaton {
        dfa(
            &[
                ("a", false),
                ("b", false),
                ("c", true),
                ("d", true),
                ("e", true),
                ("f", false),
            ],
            &[
                ("a", '0', "b"),
                ("a", '1', "c"),
                ("b", '0', "a"),
                ("b", '1', "d"),
                ("c", '0', "e"),
                ("c", '1', "f"),
                ("d", '0', "e"),
                ("d", '1', "f"),
                ("e", '0', "e"),
                ("e", '1', "f"),
                ("f", '0', "f"),
                ("f", '1', "f"),
            ],
        )
    }

    #[test]
    fn partition_refinement_wiki() {
        let dfa = wiki_dfa();
        let p = minimize(&dfa, &MinimizeConfig::default()).unwrap();
        assert_eq!(p, Partition::new([vec![0, 1], vec![5], vec![2, 3, 4]]));
        assert_eq!(p.class_of(3), Some(2));
    }

    #[test]
    fn identical_states_are_merged() {
        let dfa = dfa(
            &[("A", false), ("B", true), ("C", true)],
            &[
                ("A", 'a', "B"),
                ("A", 'b', "C"),
                ("B", 'a', "B"),
                ("B", 'b', "B"),
                ("C", 'a', "C"),
                ("C", 'b', "C"),
            ],
        );
        let p = minimize(&dfa, &MinimizeConfig::three_rounds()).unwrap();
        assert_eq!(p.len(), 2);
        assert!(p.len() < dfa.size());
    }

    #[test]
    fn missing_transitions_keep_states_apart() {
        let dfa = dfa(
            &[("A", false), ("B", true), ("C", true)],
            &[
                ("A", 'a', "B"),
                ("A", 'b', "C"),
                ("B", 'a', "B"),
                ("C", 'a', "C"),
            ],
        );
        let p = minimize(&dfa, &MinimizeConfig::default()).unwrap();
        assert_eq!(p.len(), 3);
    }

    /// q0 -> q1 -> ... -> q5, only q5 accepting: every round splits off one more state.
    fn line() -> Automaton {
        let names = (0..6).map(|i| format!("q{i}")).collect::<Vec<_>>();
        let states = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i == 5))
            .collect::<Vec<_>>();
        let mut transitions = names
            .windows(2)
            .map(|w| (w[0].as_str(), 'a', w[1].as_str()))
            .collect::<Vec<_>>();
        transitions.push(("q5", 'a', "q5"));
        dfa(&states, &transitions)
    }

    #[test]
    fn round_limit_can_under_split() {
        let dfa = line();
        assert_eq!(minimize(&dfa, &MinimizeConfig::fixpoint()).unwrap().len(), 6);
        assert_eq!(minimize(&dfa, &MinimizeConfig::three_rounds()).unwrap().len(), 5);
        assert_eq!(
            minimize(&dfa, &MinimizeConfig::with_max_rounds(0))
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn quotient_accepts_the_same_words() {
        let dfa = wiki_dfa();
        let p = minimize(&dfa, &MinimizeConfig::default()).unwrap();
        let q = p.quotient(&dfa);
        assert_eq!(q.size(), 3);
        assert_eq!(q.name(q.start().unwrap()), Some("a-b"));
        assert!(q.is_deterministic());
        for word in ["", "1", "01", "11", "0001", "100", "0110", "10"] {
            assert_eq!(accepts(&q, word), accepts(&dfa, word), "{word}");
        }
    }

    #[test]
    fn quotient_labels_may_collide() {
        let dfa = dfa(
            &[("a", false), ("b", false), ("a-b", true)],
            &[("a", 'x', "a-b"), ("b", 'x', "a-b"), ("a-b", 'x', "a-b")],
        );
        let p = minimize(&dfa, &MinimizeConfig::default()).unwrap();
        assert_eq!(p.len(), 2);

        let q = p.quotient(&dfa);
        assert_eq!(q.size(), 2);
        assert_eq!(q.name(q.start().unwrap()), Some("a-b"));
        assert!(q.state_id("a-b'").is_some_and(|id| q.is_accepting(id)));
        for word in ["", "x", "xx"] {
            assert_eq!(accepts(&q, word), accepts(&dfa, word), "{word}");
        }
    }

    #[test]
    fn nondeterministic_input_is_rejected() {
        let mut nfa = Automaton::new(Alphabet::new("a".chars()));
        let q0 = nfa.add_state("q0", false).unwrap();
        let q1 = nfa.add_state("q1", true).unwrap();
        nfa.add_transition(q0, Label::Epsilon, q1).unwrap();
        assert_eq!(
            minimize(&nfa, &MinimizeConfig::default()),
            Err(AutomatonError::Nondeterministic {
                state: "q0".to_string(),
                label: Label::Epsilon
            })
        );
    }
}
