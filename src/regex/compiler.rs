use tracing::debug;

use super::ast::{Ast, Expr};
use crate::{Automaton, Label, StateId};

/// A piece of an NFA under construction, identified by its entry and exit state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Fragment {
    pub(crate) start: StateId,
    pub(crate) end: StateId,
}

/// Regex AST to NFA compiler, following Thompson's construction.
pub(crate) struct Compiler {
    /// Current NFA being compiled from the regex syntax tree.
    nfa: Automaton,
}

impl Compiler {
    /// Compiles `ast` into an NFA whose start state is the entry of the top-level fragment and
    /// whose only accepting state is its exit.
    pub(crate) fn compile(ast: &Ast) -> Automaton {
        let mut compiler = Self {
            nfa: Automaton::new(ast.alphabet()),
        };
        let Fragment { start, end } = compiler.expr(&ast.0);

        compiler
            .nfa
            .set_start(start)
            .expect("fragment states exist");
        compiler
            .nfa
            .set_accepting(end, true)
            .expect("fragment states exist");

        debug!(
            "compiled regex {} into NFA with {} states",
            ast,
            compiler.nfa.size()
        );
        compiler.nfa
    }

    fn connect(&mut self, from: StateId, label: Label, to: StateId) {
        // Literals are part of the alphabet by construction and all states were just created.
        self.nfa
            .add_transition(from, label, to)
            .expect("compiled transitions are valid")
    }

    fn expr(&mut self, expr: &Expr) -> Fragment {
        match expr {
            Expr::Empty => {
                let state = self.nfa.fresh_state(false);
                Fragment {
                    start: state,
                    end: state,
                }
            }
            Expr::Literal(c) => {
                let start = self.nfa.fresh_state(false);
                let end = self.nfa.fresh_state(false);
                self.connect(start, Label::Symbol(*c), end);
                Fragment { start, end }
            }
            Expr::Alternation(alternatives) => {
                let root = self.nfa.fresh_state(false);
                let tail = self.nfa.fresh_state(false);
                for alternative in alternatives {
                    let Fragment { start, end } = self.expr(alternative);
                    self.connect(root, Label::Epsilon, start);
                    self.connect(end, Label::Epsilon, tail);
                }
                Fragment {
                    start: root,
                    end: tail,
                }
            }
            Expr::Concat(items) => {
                let mut fragments = items.iter().map(|item| self.expr(item)).collect::<Vec<_>>();
                let first = fragments.remove(0);
                let end = fragments.into_iter().fold(first.end, |previous_end, next| {
                    self.connect(previous_end, Label::Epsilon, next.start);
                    next.end
                });
                Fragment {
                    start: first.start,
                    end,
                }
            }
            Expr::Star(inner) => {
                let inner = self.expr(inner);
                self.star(inner)
            }
        }
    }

    /// Wraps `inner` into the four-edge Kleene star gadget.
    fn star(&mut self, inner: Fragment) -> Fragment {
        let start = self.nfa.fresh_state(false);
        let end = self.nfa.fresh_state(false);

        self.connect(start, Label::Epsilon, inner.start);
        self.connect(inner.end, Label::Epsilon, inner.start);
        self.connect(inner.end, Label::Epsilon, end);
        self.connect(start, Label::Epsilon, end);

        Fragment { start, end }
    }
}
