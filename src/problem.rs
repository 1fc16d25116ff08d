//! Readers for the line-oriented problem descriptions.
//!
//! All formats share the same building blocks: a line holding a count, a line of
//! whitespace separated tokens and a block of `from,symbol,to` transition lines where the
//! symbol `$` denotes an epsilon transition. Declared counts are only checked, with the
//! exception of the transition count, which determines how many transition lines are read.
use std::fmt::Display;

use itertools::Itertools;
use tracing::{debug, warn};

use crate::{
    determinize, minimize,
    regex::{ParseError, Regex},
    simulate, Alphabet, Automaton, AutomatonError, Label, MinimizeConfig, StateId,
};

/// An error encountered while reading a problem description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemError {
    /// The 1-based number of the line on which the error occurred.
    pub line: usize,
    /// What went wrong.
    pub kind: ProblemErrorKind,
}

/// The different kinds of [`ProblemError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProblemErrorKind {
    /// The input ended before the named line.
    MissingLine(&'static str),
    /// A count line does not hold a non-negative integer.
    InvalidCount(String),
    /// A transition line is not of the form `from,symbol,to`.
    MalformedTransition(String),
    /// The described automaton is invalid.
    Automaton(AutomatonError),
    /// The regular expression could not be parsed.
    Regex(ParseError),
}

impl Display for ProblemErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemErrorKind::MissingLine(what) => write!(f, "expected {what}, found end of input"),
            ProblemErrorKind::InvalidCount(text) => write!(f, "invalid count \"{text}\""),
            ProblemErrorKind::MalformedTransition(text) => {
                write!(f, "malformed transition \"{text}\", expected from,symbol,to")
            }
            ProblemErrorKind::Automaton(err) => write!(f, "{err}"),
            ProblemErrorKind::Regex(err) => write!(f, "{err}"),
        }
    }
}

impl Display for ProblemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for ProblemError {}

type ProblemResult<T> = Result<T, ProblemError>;

/// Cursor over the lines of a problem description that keeps track of line numbers.
struct Lines<'a> {
    inner: std::str::Lines<'a>,
    line: usize,
}

impl<'a> Lines<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            inner: input.lines(),
            line: 0,
        }
    }

    fn error(&self, kind: ProblemErrorKind) -> ProblemError {
        ProblemError {
            line: self.line,
            kind,
        }
    }

    fn fail<T, E: Into<ProblemErrorKind>>(&self, err: E) -> ProblemResult<T> {
        Err(self.error(err.into()))
    }

    fn next_line(&mut self, what: &'static str) -> ProblemResult<&'a str> {
        self.line += 1;
        self.inner
            .next()
            .ok_or_else(|| self.error(ProblemErrorKind::MissingLine(what)))
    }

    fn count(&mut self, what: &'static str) -> ProblemResult<usize> {
        let text = self.next_line(what)?.trim();
        text.parse()
            .map_err(|_| self.error(ProblemErrorKind::InvalidCount(text.to_string())))
    }

    /// Reads a line of tokens and warns if their number differs from `expected`.
    fn tokens(&mut self, what: &'static str, expected: usize) -> ProblemResult<Vec<&'a str>> {
        let tokens = self.next_line(what)?.split_whitespace().collect_vec();
        if tokens.len() != expected {
            warn!(
                "line {}: {} {} declared, but {} given",
                self.line,
                expected,
                what,
                tokens.len()
            );
        }
        Ok(tokens)
    }

    fn transition(&mut self) -> ProblemResult<Transition<'a>> {
        let text = self.next_line("transition")?.trim();
        let malformed = || ProblemErrorKind::MalformedTransition(text.to_string());
        let Some((from, symbol, to)) = text.split(',').map(str::trim).collect_tuple() else {
            return self.fail(malformed());
        };
        let mut chars = symbol.chars();
        let (Some(token), None) = (chars.next(), chars.next()) else {
            return self.fail(malformed());
        };
        if from.is_empty() || to.is_empty() {
            return self.fail(malformed());
        }
        Ok(Transition {
            line: self.line,
            from,
            label: Label::from_token(token),
            to,
        })
    }

    fn transitions(&mut self) -> ProblemResult<Vec<Transition<'a>>> {
        let count = self.count("transition count")?;
        (0..count).map(|_| self.transition()).collect()
    }

    /// The input word, which may be omitted entirely to denote the empty word.
    fn input(&mut self) -> String {
        self.line += 1;
        self.inner.next().unwrap_or_default().to_string()
    }
}

impl From<AutomatonError> for ProblemErrorKind {
    fn from(value: AutomatonError) -> Self {
        ProblemErrorKind::Automaton(value)
    }
}

struct Transition<'a> {
    line: usize,
    from: &'a str,
    label: Label,
    to: &'a str,
}

impl Transition<'_> {
    fn error(&self, err: AutomatonError) -> ProblemError {
        ProblemError {
            line: self.line,
            kind: err.into(),
        }
    }
}

/// Reads the alphabet line. Tokens may hold several symbols each, `$` is dropped.
fn alphabet(lines: &mut Lines<'_>) -> ProblemResult<Alphabet> {
    let size = lines.count("alphabet size")?;
    let line = lines.next_line("alphabet")?;
    let alphabet = Alphabet::new(line.split_whitespace().flat_map(str::chars));
    if alphabet.len() != size {
        warn!(
            "line {}: alphabet of size {} declared, but {} given",
            lines.line,
            size,
            alphabet.len()
        );
    }
    Ok(alphabet)
}

/// Reads the common preamble of the NFA formats: states, alphabet, final states and
/// transitions. Every referenced state must have been declared.
fn nfa(lines: &mut Lines<'_>) -> ProblemResult<Automaton> {
    let count = lines.count("state count")?;
    let states = lines.tokens("states", count)?;
    let mut nfa = Automaton::new(alphabet(lines)?);
    for name in states {
        nfa.add_state(name, false).or_else(|e| lines.fail(e))?;
    }

    let count = lines.count("final state count")?;
    for name in lines.tokens("final states", count)? {
        let id = nfa.require_state(name).or_else(|e| lines.fail(e))?;
        nfa.set_accepting(id, true).or_else(|e| lines.fail(e))?;
    }

    for t in lines.transitions()? {
        let resolve = |name: &str| nfa.require_state(name).map_err(|e| t.error(e));
        let (from, to) = (resolve(t.from)?, resolve(t.to)?);
        nfa.add_transition(from, t.label, to)
            .map_err(|e| t.error(e))?;
    }
    Ok(nfa)
}

/// Decide whether an NFA accepts a word.
#[derive(Debug, Clone)]
pub struct AcceptanceProblem {
    /// The automaton, its start state is the first declared state.
    pub nfa: Automaton,
    /// The word to decide.
    pub input: String,
}

impl AcceptanceProblem {
    /// Returns true iff the automaton accepts the word.
    pub fn solve(&self) -> bool {
        simulate::accepts(&self.nfa, &self.input)
    }
}

/// Reads an [`AcceptanceProblem`].
pub fn read_acceptance(input: &str) -> Result<AcceptanceProblem, ProblemError> {
    let mut lines = Lines::new(input);
    let nfa = nfa(&mut lines)?;
    let input = lines.input();
    debug!("read acceptance problem with {} states", nfa.size());
    Ok(AcceptanceProblem { nfa, input })
}

/// Count the states of the DFA obtained by subset construction.
#[derive(Debug, Clone)]
pub struct DeterminizeProblem {
    /// The automaton to determinize, its start state is the first declared state.
    pub nfa: Automaton,
}

impl DeterminizeProblem {
    /// The number of states of the DFA, including the trap state if one was needed.
    pub fn solve(&self) -> usize {
        determinize(&self.nfa).state_count()
    }
}

/// Reads a [`DeterminizeProblem`].
pub fn read_determinize(input: &str) -> Result<DeterminizeProblem, ProblemError> {
    let mut lines = Lines::new(input);
    let nfa = nfa(&mut lines)?;
    debug!("read determinization problem with {} states", nfa.size());
    Ok(DeterminizeProblem { nfa })
}

/// Decide whether a regular expression matches a word.
#[derive(Debug, Clone)]
pub struct RegexProblem {
    /// The compiled expression.
    pub regex: Regex,
    /// The word to match.
    pub input: String,
}

impl RegexProblem {
    /// Returns true iff the expression matches the whole word.
    pub fn solve(&self) -> bool {
        self.regex.is_match(&self.input)
    }
}

/// Reads a [`RegexProblem`]. The first two lines carry no information and are skipped.
pub fn read_regex(input: &str) -> Result<RegexProblem, ProblemError> {
    let mut lines = Lines::new(input);
    lines.next_line("first header line")?;
    lines.next_line("second header line")?;
    let pattern = lines.next_line("regular expression")?;
    let regex = Regex::new(pattern).or_else(|e| lines.fail(ProblemErrorKind::Regex(e)))?;
    let input = lines.input();
    Ok(RegexProblem { regex, input })
}

/// Count the equivalence classes of the states of a DFA.
#[derive(Debug, Clone)]
pub struct MinimizeProblem {
    /// The automaton to reduce.
    pub dfa: Automaton,
}

impl MinimizeProblem {
    /// The number of classes after refining as configured.
    pub fn solve(&self, config: &MinimizeConfig) -> Result<usize, AutomatonError> {
        Ok(minimize(&self.dfa, config)?.len())
    }
}

/// Reads a [`MinimizeProblem`].
///
/// Only the first token of the state line is used, it names the start state. The final
/// states and all targets of transitions are declared implicitly. A later transition for the
/// same state and symbol replaces an earlier one.
pub fn read_minimize(input: &str) -> Result<MinimizeProblem, ProblemError> {
    let mut lines = Lines::new(input);
    lines.count("state count")?;
    let start = lines
        .next_line("start state")?
        .split_whitespace()
        .next()
        .map(str::to_string)
        .ok_or_else(|| lines.error(ProblemErrorKind::MissingLine("start state")))?;
    let mut dfa = Automaton::new(alphabet(&mut lines)?);
    dfa.add_state(start, false).or_else(|e| lines.fail(e))?;

    let count = lines.count("final state count")?;
    for name in lines.tokens("final states", count)? {
        let id = dfa.ensure_state(name);
        dfa.set_accepting(id, true).or_else(|e| lines.fail(e))?;
    }

    let transitions = lines.transitions()?;
    for t in &transitions {
        dfa.ensure_state(t.to);
    }
    for t in &transitions {
        let from: StateId = dfa.require_state(t.from).map_err(|e| t.error(e))?;
        let to = dfa.require_state(t.to).map_err(|e| t.error(e))?;
        let added = match t.label {
            Label::Symbol(symbol) => dfa.set_transition(from, symbol, to),
            // rejected later on, a DFA has no epsilon transitions
            Label::Epsilon => dfa.add_transition(from, Label::Epsilon, to),
        };
        added.map_err(|e| t.error(e))?;
    }
    debug!("read minimization problem with {} states", dfa.size());
    Ok(MinimizeProblem { dfa })
}

#[cfg(test)]
mod tests {
    use super::{
        read_acceptance, read_determinize, read_minimize, read_regex, ProblemError,
        ProblemErrorKind,
    };
    use crate::{regex::ParseErrorKind, AutomatonError, MinimizeConfig};
    use pretty_assertions::assert_eq;

    const SINGLE: &str = "2\nq0 q1\n1\na\n1\nq1\n1\nq0,a,q1\n";

    #[test]
    fn acceptance() {
        let problem = read_acceptance(&format!("{SINGLE}a")).unwrap();
        assert!(problem.solve());
        let problem = read_acceptance(&format!("{SINGLE}aa")).unwrap();
        assert!(!problem.solve());
        // the input line may be missing entirely
        let problem = read_acceptance(SINGLE).unwrap();
        assert_eq!(problem.input, "");
        assert!(!problem.solve());
    }

    #[test]
    fn acceptance_with_epsilon() {
        let problem = read_acceptance("3\nq0 q1 q2\n2\na $\n1\nq2\n2\nq0,$,q1\nq1,a,q2\na").unwrap();
        assert_eq!(problem.nfa.alphabet().len(), 1);
        assert!(problem.solve());
    }

    #[test]
    fn determinize_counts_trap() {
        assert_eq!(read_determinize(SINGLE).unwrap().solve(), 3);
        let total = "2\nq0 q1\n1\na\n1\nq1\n2\nq0,a,q1\nq1,a,q1\n";
        assert_eq!(read_determinize(total).unwrap().solve(), 2);
    }

    #[test]
    fn regex_problem() {
        let problem = read_regex("x\ny\n(a|b)*c\nabac").unwrap();
        assert!(problem.solve());
        let problem = read_regex("x\ny\n(a|b)*c\nabca").unwrap();
        assert!(!problem.solve());
        let err = read_regex("\n\n(a\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(matches!(
            err.kind,
            ProblemErrorKind::Regex(e) if e.kind == ParseErrorKind::UnclosedGroup
        ));
    }

    #[test]
    fn minimize_declares_states_implicitly() {
        let input = "3\nA B C\n2\na b\n2\nB C\n6\nA,a,B\nA,b,C\nB,a,B\nB,b,B\nC,a,C\nC,b,C\n";
        let problem = read_minimize(input).unwrap();
        assert_eq!(problem.dfa.size(), 3);
        assert_eq!(problem.dfa.name(problem.dfa.start().unwrap()), Some("A"));
        assert_eq!(problem.solve(&MinimizeConfig::three_rounds()), Ok(2));
    }

    #[test]
    fn minimize_targets_may_appear_late() {
        let input = "3\nA\n1\na\n1\nC\n3\nB,a,C\nA,a,B\nC,a,C\n";
        let problem = read_minimize(input).unwrap();
        assert_eq!(problem.solve(&MinimizeConfig::default()), Ok(3));
    }

    #[test]
    fn minimize_rejects_unknown_source() {
        let input = "2\nA\n1\na\n1\nB\n2\nA,a,B\nX,a,A\n";
        assert_eq!(
            read_minimize(input).unwrap_err(),
            ProblemError {
                line: 9,
                kind: ProblemErrorKind::Automaton(AutomatonError::MissingState("X".to_string())),
            }
        );
    }

    #[test]
    fn malformed_input() {
        assert_eq!(
            read_acceptance("two\n").unwrap_err(),
            ProblemError {
                line: 1,
                kind: ProblemErrorKind::InvalidCount("two".to_string()),
            }
        );
        assert_eq!(
            read_determinize("1\nq0\n1\na\n0\n\n1\nq0;a;q0\n").unwrap_err(),
            ProblemError {
                line: 8,
                kind: ProblemErrorKind::MalformedTransition("q0;a;q0".to_string()),
            }
        );
        assert_eq!(
            read_determinize("1\nq0\n1\na\n0\n\n2\nq0,a,q0\n")
                .unwrap_err()
                .kind,
            ProblemErrorKind::MissingLine("transition")
        );
        assert_eq!(
            read_acceptance("1\nq0\n1\na\n1\nq1\n0\n").unwrap_err(),
            ProblemError {
                line: 6,
                kind: ProblemErrorKind::Automaton(AutomatonError::MissingState("q1".to_string())),
            }
        );
    }

    #[test]
    fn count_mismatch_is_tolerated() {
        let problem = read_acceptance("5\nq0 q1\n7\na\n1\nq1\n1\nq0,a,q1\na").unwrap();
        assert_eq!(problem.nfa.size(), 2);
        assert!(problem.solve());
    }
}
