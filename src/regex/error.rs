/// Whether the parsing of the regex succeeded.
pub type ParseResult<T> = core::result::Result<T, ParseError>;

/// Information about the error occurred during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Character offset in the pattern at which the error was detected.
    pub pos: usize,
}

/// The ways in which a pattern can be malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// `()`
    EmptyGroup,
    /// An alternative without any content, as in `a|`, `|a` or `a||b`.
    EmptyAlternative,
    /// A `*` at the start of the pattern, a group or an alternative.
    NothingToRepeat,
    /// A `(` without matching `)`.
    UnclosedGroup,
    /// A `)` without matching `(`.
    UnmatchedRightParen,
    /// A backslash at the very end of the pattern.
    DanglingEscape,
}

impl ParseError {
    pub(super) fn new(kind: ParseErrorKind, pos: usize) -> Self {
        Self { kind, pos }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ParseErrorKind::*;
        write!(
            f,
            "{}",
            match self {
                EmptyGroup => "expected at least one item in the group",
                EmptyAlternative => "expected at least one item in the alternative",
                NothingToRepeat => "expected CHARACTER or group before STAR",
                UnclosedGroup => "expected RIGHT_PAREN",
                UnmatchedRightParen => "unexpected RIGHT_PAREN",
                DanglingEscape => "expected a character after the escaping backslash",
            }
        )
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[ERROR] ({}): {}", self.pos, self.kind)
    }
}

impl std::error::Error for ParseError {}
