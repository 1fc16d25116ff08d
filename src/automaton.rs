use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    fmt::Display,
};

use itertools::Itertools;
use tracing::trace;

use crate::{Alphabet, Label, Map, Set};

/// Identifies a state within a single [`Automaton`]. Ids are handed out in increasing order
/// and never reused, even after a state has been removed.
pub type StateId = usize;

static NO_TARGETS: BTreeSet<StateId> = BTreeSet::new();

#[derive(Debug, Clone, PartialEq, Eq)]
struct State {
    name: String,
    accepting: bool,
    edges: BTreeMap<Label, BTreeSet<StateId>>,
}

impl State {
    fn new(name: String, accepting: bool) -> Self {
        Self {
            name,
            accepting,
            edges: BTreeMap::new(),
        }
    }
}

/// A finite automaton over an [`Alphabet`], consisting of named states, a transition relation
/// that maps a state and a [`Label`] to a *set* of states, a designated start state and a
/// set of accepting states.
///
/// The same structure is used for nondeterministic automata (possibly with epsilon edges)
/// and for deterministic ones, the latter simply have a functional relation without epsilon
/// edges, see [`Automaton::is_deterministic`].
///
/// There is no implicit trap state: a missing transition means that no move is possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    alphabet: Alphabet,
    states: BTreeMap<StateId, State>,
    names: Map<String, StateId>,
    start: Option<StateId>,
    next_id: StateId,
}

impl Automaton {
    /// Creates an automaton without any states over the given alphabet. The first state that
    /// is added becomes the start state.
    pub fn new(alphabet: Alphabet) -> Self {
        Self {
            alphabet,
            states: BTreeMap::new(),
            names: Map::default(),
            start: None,
            next_id: 0,
        }
    }

    /// Returns a reference to the alphabet of the automaton.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Adds a state with the given `name`. Fails if a state of the same name exists already.
    pub fn add_state<N: Into<String>>(
        &mut self,
        name: N,
        accepting: bool,
    ) -> Result<StateId, AutomatonError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(AutomatonError::DuplicateState(name));
        }
        let id = self.next_id;
        self.next_id += 1;
        self.names.insert(name.clone(), id);
        self.states.insert(id, State::new(name, accepting));
        if self.start.is_none() {
            self.start = Some(id);
        }
        Ok(id)
    }

    /// Adds a state with a generated name. States are named `1`, `2`, ... in the order in
    /// which they are created.
    pub fn fresh_state(&mut self, accepting: bool) -> StateId {
        let mut name = (self.next_id + 1).to_string();
        while self.names.contains_key(&name) {
            name.push('\'');
        }
        self.add_state(name, accepting)
            .expect("generated names are unique")
    }

    /// Returns the id of the state called `name`, adding a non-accepting state of that name
    /// if there is none yet.
    pub fn ensure_state(&mut self, name: &str) -> StateId {
        match self.state_id(name) {
            Some(id) => id,
            None => {
                trace!("implicitly declaring state {name}");
                self.add_state(name, false)
                    .expect("name was checked to be free")
            }
        }
    }

    /// Removes a state together with all transitions leading into it. The start state cannot
    /// be removed.
    pub fn remove_state(&mut self, id: StateId) -> Result<(), AutomatonError> {
        let name = self.name_of(id)?.to_string();
        if self.start == Some(id) {
            return Err(AutomatonError::StartStateRemoval(name));
        }
        self.states.remove(&id);
        self.names.remove(&name);
        for state in self.states.values_mut() {
            for targets in state.edges.values_mut() {
                targets.remove(&id);
            }
            state.edges.retain(|_, targets| !targets.is_empty());
        }
        Ok(())
    }

    /// The start state, or `None` if the automaton has no states.
    pub fn start(&self) -> Option<StateId> {
        self.start
    }

    /// Makes `id` the start state.
    pub fn set_start(&mut self, id: StateId) -> Result<(), AutomatonError> {
        self.name_of(id)?;
        self.start = Some(id);
        Ok(())
    }

    /// Sets whether `id` is accepting.
    pub fn set_accepting(&mut self, id: StateId, accepting: bool) -> Result<(), AutomatonError> {
        self.state_mut(id)?.accepting = accepting;
        Ok(())
    }

    /// Returns true iff `id` is an accepting state. Unknown states are not accepting.
    pub fn is_accepting(&self, id: StateId) -> bool {
        self.states.get(&id).map(|s| s.accepting).unwrap_or(false)
    }

    /// Adds the transition `from --label--> to`. Fails if `label` is a symbol outside the
    /// alphabet, or if one of the states does not exist.
    pub fn add_transition<L: Into<Label>>(
        &mut self,
        from: StateId,
        label: L,
        to: StateId,
    ) -> Result<(), AutomatonError> {
        let label = label.into();
        self.check_transition(from, label, to)?;
        self.state_mut(from)?
            .edges
            .entry(label)
            .or_default()
            .insert(to);
        Ok(())
    }

    /// Replaces all transitions from `from` on `symbol` with a single one to `to`.
    pub fn set_transition(
        &mut self,
        from: StateId,
        symbol: char,
        to: StateId,
    ) -> Result<(), AutomatonError> {
        let label = Label::Symbol(symbol);
        self.check_transition(from, label, to)?;
        self.state_mut(from)?
            .edges
            .insert(label, BTreeSet::from([to]));
        Ok(())
    }

    fn check_transition(
        &self,
        from: StateId,
        label: Label,
        to: StateId,
    ) -> Result<(), AutomatonError> {
        if let Label::Symbol(symbol) = label {
            if !self.alphabet.contains(symbol) {
                return Err(AutomatonError::InvalidSymbol(symbol));
            }
        }
        self.name_of(from)?;
        self.name_of(to)?;
        Ok(())
    }

    /// Returns the set of states reachable from `id` by a single `label` edge. The set is empty
    /// if there are no such edges or the state does not exist.
    pub fn transitions<L: Into<Label>>(&self, id: StateId, label: L) -> &BTreeSet<StateId> {
        self.states
            .get(&id)
            .and_then(|s| s.edges.get(&label.into()))
            .unwrap_or(&NO_TARGETS)
    }

    /// Returns the unique successor of `id` on `symbol`, if the relation is functional there.
    pub fn successor(&self, id: StateId, symbol: char) -> Option<StateId> {
        let targets = self.transitions(id, symbol);
        if targets.len() == 1 {
            targets.first().copied()
        } else {
            None
        }
    }

    /// Iterates over all outgoing edges of `id` as pairs of label and target.
    pub fn edges(&self, id: StateId) -> impl Iterator<Item = (Label, StateId)> + '_ {
        self.states.get(&id).into_iter().flat_map(|s| {
            s.edges
                .iter()
                .flat_map(|(label, targets)| targets.iter().map(move |t| (*label, *t)))
        })
    }

    /// Returns true if a state with the given id exists.
    pub fn contains(&self, id: StateId) -> bool {
        self.states.contains_key(&id)
    }

    /// Looks up the id of the state called `name`.
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.names.get(name).copied()
    }

    /// Looks up a state by name, failing with [`AutomatonError::MissingState`].
    pub fn require_state(&self, name: &str) -> Result<StateId, AutomatonError> {
        self.state_id(name)
            .ok_or_else(|| AutomatonError::MissingState(name.to_string()))
    }

    /// Returns the name of `id`.
    pub fn name(&self, id: StateId) -> Option<&str> {
        self.states.get(&id).map(|s| s.name.as_str())
    }

    fn name_of(&self, id: StateId) -> Result<&str, AutomatonError> {
        self.name(id)
            .ok_or_else(|| AutomatonError::MissingState(format!("#{id}")))
    }

    fn state_mut(&mut self, id: StateId) -> Result<&mut State, AutomatonError> {
        self.states
            .get_mut(&id)
            .ok_or_else(|| AutomatonError::MissingState(format!("#{id}")))
    }

    /// Iterates over the ids of all states in ascending order.
    pub fn states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.keys().copied()
    }

    /// Iterates over the accepting states.
    pub fn accepting_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states
            .iter()
            .filter(|(_, s)| s.accepting)
            .map(|(id, _)| *id)
    }

    /// Iterates over the states that are not accepting.
    pub fn rejecting_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states
            .iter()
            .filter(|(_, s)| !s.accepting)
            .map(|(id, _)| *id)
    }

    /// Returns the states reachable from the start state along edges of any label, in
    /// breadth-first order. Empty if there is no start state.
    pub fn reachable_states(&self) -> Vec<StateId> {
        let Some(start) = self.start else {
            return Vec::new();
        };
        let mut seen = Set::from_iter([start]);
        let mut queue = VecDeque::from([start]);
        let mut reachable = Vec::new();

        while let Some(state) = queue.pop_front() {
            reachable.push(state);
            for (_, target) in self.edges(state) {
                if seen.insert(target) {
                    queue.push_back(target);
                }
            }
        }
        reachable
    }

    /// The number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Returns true iff there are no states.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Verifies that the automaton is deterministic, i.e. it has no epsilon edges and at most
    /// one target for every state and symbol. Reports the first offending state.
    pub fn check_deterministic(&self) -> Result<(), AutomatonError> {
        for state in self.states.values() {
            for (label, targets) in &state.edges {
                if label.is_epsilon() || targets.len() > 1 {
                    return Err(AutomatonError::Nondeterministic {
                        state: state.name.clone(),
                        label: *label,
                    });
                }
            }
        }
        Ok(())
    }

    /// Returns true iff [`Automaton::check_deterministic`] succeeds.
    pub fn is_deterministic(&self) -> bool {
        self.check_deterministic().is_ok()
    }
}

impl Display for Automaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |id: StateId| self.name(id).unwrap_or("?").to_string();
        writeln!(
            f,
            "start: {}",
            self.start.map(show).unwrap_or_else(|| "-".to_string())
        )?;
        writeln!(
            f,
            "accepting: {{{}}}",
            self.accepting_states().map(show).join(", ")
        )?;
        for id in self.states() {
            for (label, target) in self.edges(id) {
                writeln!(f, "{} --{}--> {}", show(id), label, show(target))?;
            }
        }
        Ok(())
    }
}

/// The errors that can occur when constructing or editing an [`Automaton`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutomatonError {
    /// A transition uses a symbol that is neither in the alphabet nor epsilon.
    InvalidSymbol(char),
    /// A referenced state has not been declared.
    MissingState(String),
    /// A state of this name exists already.
    DuplicateState(String),
    /// The start state cannot be removed.
    StartStateRemoval(String),
    /// A deterministic automaton was required, but the state has an epsilon edge or more
    /// than one target for the label.
    Nondeterministic {
        /// Name of the offending state.
        state: String,
        /// The label on which the state is nondeterministic.
        label: Label,
    },
}

impl Display for AutomatonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AutomatonError::InvalidSymbol(symbol) => {
                write!(f, "Invalid symbol '{symbol}', it is not part of the alphabet")
            }
            AutomatonError::MissingState(name) => write!(f, "Missing state {name}"),
            AutomatonError::DuplicateState(name) => write!(f, "State {name} is declared twice"),
            AutomatonError::StartStateRemoval(name) => {
                write!(f, "Cannot remove the start state {name}")
            }
            AutomatonError::Nondeterministic { state, label } => {
                write!(f, "State {state} is nondeterministic on {label}")
            }
        }
    }
}

impl std::error::Error for AutomatonError {}

#[cfg(test)]
mod tests {
    use super::{Automaton, AutomatonError};
    use crate::{Alphabet, Label};
    use pretty_assertions::assert_eq;

    fn ab() -> Automaton {
        Automaton::new(Alphabet::new("ab".chars()))
    }

    #[test]
    fn first_state_is_start() {
        let mut aut = ab();
        let q0 = aut.add_state("q0", false).unwrap();
        let q1 = aut.add_state("q1", true).unwrap();
        assert_eq!(aut.start(), Some(q0));
        assert!(aut.is_accepting(q1));
        assert_eq!(
            aut.add_state("q1", false),
            Err(AutomatonError::DuplicateState("q1".to_string()))
        );
        aut.set_start(q1).unwrap();
        assert_eq!(aut.start(), Some(q1));
    }

    #[test]
    fn transitions_are_sets() {
        let mut aut = ab();
        let q0 = aut.add_state("q0", false).unwrap();
        let q1 = aut.add_state("q1", false).unwrap();
        aut.add_transition(q0, 'a', q0).unwrap();
        aut.add_transition(q0, 'a', q1).unwrap();
        aut.add_transition(q0, Label::Epsilon, q1).unwrap();

        assert_eq!(aut.transitions(q0, 'a').len(), 2);
        assert!(aut.transitions(q0, 'b').is_empty());
        assert!(aut.transitions(q1, 'a').is_empty());
        assert_eq!(aut.successor(q0, 'a'), None);
        assert_eq!(aut.edges(q0).count(), 3);
        assert!(!aut.is_deterministic());
    }

    #[test]
    fn invalid_symbol_and_missing_state() {
        let mut aut = ab();
        let q0 = aut.add_state("q0", false).unwrap();
        assert_eq!(
            aut.add_transition(q0, 'c', q0),
            Err(AutomatonError::InvalidSymbol('c'))
        );
        assert_eq!(
            aut.add_transition(q0, 'a', 7),
            Err(AutomatonError::MissingState("#7".to_string()))
        );
        assert_eq!(
            aut.require_state("nope"),
            Err(AutomatonError::MissingState("nope".to_string()))
        );
    }

    #[test]
    fn removal_drops_incoming_edges() {
        let mut aut = ab();
        let q0 = aut.add_state("q0", false).unwrap();
        let q1 = aut.add_state("q1", true).unwrap();
        aut.add_transition(q0, 'a', q1).unwrap();
        aut.add_transition(q1, 'b', q0).unwrap();

        assert_eq!(
            aut.remove_state(q0),
            Err(AutomatonError::StartStateRemoval("q0".to_string()))
        );
        aut.remove_state(q1).unwrap();
        assert_eq!(aut.size(), 1);
        assert_eq!(aut.state_id("q1"), None);
        assert_eq!(aut.edges(q0).count(), 0);
        // ids are not reused
        let q2 = aut.add_state("q2", false).unwrap();
        assert_ne!(q2, q1);
    }

    #[test]
    fn functional_replacement() {
        let mut aut = ab();
        let q0 = aut.add_state("q0", false).unwrap();
        let q1 = aut.add_state("q1", false).unwrap();
        aut.set_transition(q0, 'a', q0).unwrap();
        aut.set_transition(q0, 'a', q1).unwrap();
        assert_eq!(aut.successor(q0, 'a'), Some(q1));
        assert!(aut.is_deterministic());
    }

    #[test]
    fn fresh_names_count_up() {
        let mut aut = ab();
        let s = aut.fresh_state(false);
        let t = aut.fresh_state(true);
        assert_eq!(aut.name(s), Some("1"));
        assert_eq!(aut.name(t), Some("2"));
        assert_eq!(aut.ensure_state("2"), t);
        let u = aut.ensure_state("x");
        assert_eq!(aut.name(u), Some("x"));
        assert!(!aut.is_accepting(u));
    }

    #[test]
    fn reachable_states_follow_every_label() {
        let mut aut = ab();
        let q0 = aut.add_state("q0", false).unwrap();
        let q1 = aut.add_state("q1", false).unwrap();
        let q2 = aut.add_state("q2", true).unwrap();
        let q3 = aut.add_state("q3", false).unwrap();
        aut.add_transition(q0, Label::Epsilon, q1).unwrap();
        aut.add_transition(q1, 'a', q2).unwrap();
        aut.add_transition(q2, 'b', q0).unwrap();
        aut.add_transition(q3, 'a', q0).unwrap();

        assert_eq!(aut.reachable_states(), vec![q0, q1, q2]);
        assert!(ab().reachable_states().is_empty());
    }
}
