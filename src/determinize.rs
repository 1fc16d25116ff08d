//! Epsilon closures and the subset construction.
//!
//! Every state of the resulting DFA corresponds to a set of NFA states, identified by the
//! set's members and not by the order in which they were found. Whenever some member of a
//! subset cannot move on a symbol, the construction notes that a trap state is needed to
//! keep the DFA total.
use std::collections::{BTreeSet, VecDeque};

use itertools::Itertools;
use tracing::{debug, trace};

use crate::{Automaton, Label, Map, StateId};

/// Name of the synthetic trap state added by [`determinize`].
pub const TRAP_STATE: &str = "trap";

/// A set of NFA states, which is a single state of the determinized automaton.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateSet(BTreeSet<StateId>);

impl StateSet {
    /// Returns true if there are no states in the set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of states in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if `state` is a member.
    pub fn contains(&self, state: StateId) -> bool {
        self.0.contains(&state)
    }

    /// Iterates over the members in ascending order of their ids.
    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.0.iter().copied()
    }

    /// The canonical label of the set, see [`canonical_label`].
    pub fn label(&self, nfa: &Automaton) -> String {
        canonical_label(self.iter().filter_map(|q| nfa.name(q)))
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<T: IntoIterator<Item = StateId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<StateId> for StateSet {
    fn extend<T: IntoIterator<Item = StateId>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

/// Joins the given state names, sorted and without duplicates, with `-`. The result does not
/// depend on the order of `names`.
pub fn canonical_label<'a, I: IntoIterator<Item = &'a str>>(names: I) -> String {
    names.into_iter().sorted().dedup().join("-")
}

/// Computes the epsilon closure of `state`: the state itself and every state reachable from
/// it using only epsilon edges.
pub fn epsilon_closure(nfa: &Automaton, state: StateId) -> StateSet {
    let mut not_visited = VecDeque::from([state]);
    let mut result = BTreeSet::from([state]);

    while let Some(current) = not_visited.pop_front() {
        for next in nfa.transitions(current, Label::Epsilon) {
            if result.insert(*next) {
                not_visited.push_back(*next)
            }
        }
    }

    StateSet(result)
}

/// The epsilon closure of every state of an automaton, computed once up front.
#[derive(Debug, Clone)]
pub struct ClosureTable(Map<StateId, StateSet>);

impl ClosureTable {
    /// Computes the closures of all states of `nfa`.
    pub fn new(nfa: &Automaton) -> Self {
        Self(
            nfa.states()
                .map(|q| (q, epsilon_closure(nfa, q)))
                .collect(),
        )
    }

    /// The closure of `state`, which is empty only for states unknown to the automaton.
    pub fn closure(&self, state: StateId) -> StateSet {
        self.0.get(&state).cloned().unwrap_or_default()
    }

    /// The union of the closures of all members of `states`.
    pub fn closure_of_set(&self, states: &StateSet) -> StateSet {
        states
            .iter()
            .flat_map(|q| self.0.get(&q).into_iter().flat_map(|closure| closure.iter()))
            .collect()
    }
}

/// The outcome of moving a [`StateSet`] on a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// All states reachable, closed under epsilon edges.
    pub states: StateSet,
    /// True if some member of the source set had no transition on the symbol from any state
    /// in its closure.
    pub trap: bool,
}

/// Moves every member of `current` (through its epsilon closure) along `symbol` and closes
/// the union of the targets under epsilon edges.
pub fn next_state(
    nfa: &Automaton,
    closures: &ClosureTable,
    current: &StateSet,
    symbol: char,
) -> Step {
    let mut reachable = StateSet::default();
    let mut trap = false;

    for state in current.iter() {
        let mut has_transition = false;
        for q in closures.closure(state).iter() {
            let targets = nfa.transitions(q, symbol);
            if !targets.is_empty() {
                reachable.extend(targets.iter().copied());
                has_transition = true;
            }
        }
        if !has_transition {
            trap = true;
        }
    }

    Step {
        states: closures.closure_of_set(&reachable),
        trap,
    }
}

/// The result of the subset construction.
#[derive(Debug, Clone)]
pub struct Determinized {
    /// The deterministic automaton, its states are named by the canonical labels of their
    /// subsets.
    pub dfa: Automaton,
    /// The subset each DFA state stands for, the trap state has none.
    pub subsets: Map<StateId, StateSet>,
    /// The trap state, present if a trap was triggered during exploration.
    pub trap: Option<StateId>,
}

impl Determinized {
    /// The number of DFA states, including the trap state if one was needed.
    pub fn state_count(&self) -> usize {
        self.dfa.size()
    }

    /// The number of subsets discovered, not counting the trap state.
    pub fn subset_count(&self) -> usize {
        self.subsets.len()
    }

    /// Returns true if the construction had to add a trap state.
    pub fn has_trap(&self) -> bool {
        self.trap.is_some()
    }
}

/// Converts `nfa` into a DFA by the subset construction, exploring breadth-first from the
/// epsilon closure of the start state. Only subsets reachable from there are created.
///
/// If at any point some member of a subset has no transition on some symbol, a
/// non-accepting trap state looping on every symbol is added and all moves to the empty set
/// are directed to it. The trap counts as a state even if every such move still found
/// targets through other members.
pub fn determinize(nfa: &Automaton) -> Determinized {
    let symbols = nfa.alphabet().symbols().collect::<Vec<_>>();
    determinize_in_order(nfa, &symbols)
}

/// Like [`determinize`], but trying the symbols in the given order for every subset.
fn determinize_in_order(nfa: &Automaton, symbols: &[char]) -> Determinized {
    let mut dfa = Automaton::new(nfa.alphabet().clone());
    let mut subsets = Map::default();

    let Some(start) = nfa.start() else {
        debug!("NFA has no start state, the DFA is empty");
        return Determinized {
            dfa,
            subsets,
            trap: None,
        };
    };

    let closures = ClosureTable::new(nfa);
    let mut ids: Map<StateSet, StateId> = Map::default();
    let mut queue = VecDeque::new();
    let mut moves = Vec::new();
    let mut trap_triggered = false;

    let initial = closures.closure(start);
    let initial_id = add_subset(nfa, &mut dfa, &initial);
    ids.insert(initial.clone(), initial_id);
    queue.push_back(initial);

    while let Some(current) = queue.pop_front() {
        let source = ids[&current];
        for &symbol in symbols {
            let Step { states, trap } = next_state(nfa, &closures, &current, symbol);
            trap_triggered |= trap;

            if states.is_empty() {
                trace!("{} has no move on {}", current.label(nfa), symbol);
                moves.push((source, symbol, None));
                continue;
            }

            let target = match ids.get(&states) {
                Some(id) => *id,
                None => {
                    let id = add_subset(nfa, &mut dfa, &states);
                    trace!(
                        "discovered {} from {} on {}",
                        states.label(nfa),
                        current.label(nfa),
                        symbol
                    );
                    ids.insert(states.clone(), id);
                    queue.push_back(states);
                    id
                }
            };
            moves.push((source, symbol, Some(target)));
        }
    }

    let trap = trap_triggered.then(|| {
        let mut name = TRAP_STATE.to_string();
        while dfa.state_id(&name).is_some() {
            name.push('\'');
        }
        let trap = dfa
            .add_state(name, false)
            .expect("name was checked to be free");
        for &symbol in symbols {
            dfa.set_transition(trap, symbol, trap)
                .expect("trap state and alphabet symbols are valid");
        }
        trap
    });

    for (source, symbol, target) in moves {
        if let Some(target) = target.or(trap) {
            dfa.set_transition(source, symbol, target)
                .expect("subset states and alphabet symbols are valid");
        }
    }

    for (subset, id) in ids {
        subsets.insert(id, subset);
    }

    debug!(
        "determinized NFA with {} states into DFA with {} states (trap: {})",
        nfa.size(),
        dfa.size(),
        trap.is_some()
    );

    Determinized { dfa, subsets, trap }
}

fn add_subset(nfa: &Automaton, dfa: &mut Automaton, subset: &StateSet) -> StateId {
    let accepting = subset.iter().any(|q| nfa.is_accepting(q));
    let mut name = subset.label(nfa);
    while dfa.state_id(&name).is_some() {
        name.push('\'');
    }
    dfa.add_state(name, accepting)
        .expect("name was checked to be free")
}
