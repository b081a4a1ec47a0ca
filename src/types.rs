//! This module defines the core data structures and types used throughout the Turing Machine
//! simulator, including symbols, head moves, transitions, the machine vocabulary, run
//! configuration, and error types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// A single tape symbol.
pub type Symbol = char;
/// A state name.
pub type State = String;
/// A logical (unbounded, possibly negative) position on a tape.
pub type Position = i64;

/// The blank symbol. Every cell that was never written holds it.
pub const BLANK_SYMBOL: Symbol = '_';
/// The wildcard marker accepted in the read and write columns of a transition.
pub const WILDCARD: Symbol = '*';
/// Characters that can never be declared as tape symbols.
pub const RESERVED_SYMBOLS: [Symbol; 6] = [' ', ',', ';', '{', '}', WILDCARD];
/// The maximum allowed size for a machine description in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// The maximum number of concrete transitions a machine may expand into.
pub const MAX_EXPANDED_TRANSITIONS: usize = 65536;

/// Represents the possible directions a Turing Machine head can move.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Move {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Move {
    /// The signed displacement this move applies to a head position.
    pub fn offset(self) -> Position {
        match self {
            Move::Left => -1,
            Move::Right => 1,
            Move::Stay => 0,
        }
    }

    /// The character used for this move in a `.tm` description.
    pub fn as_char(self) -> char {
        match self {
            Move::Left => 'l',
            Move::Right => 'r',
            Move::Stay => '*',
        }
    }

    /// Parses a string of move characters, one per tape.
    pub fn parse_all(moves: &str) -> Result<Vec<Move>, TuringMachineError> {
        moves.chars().map(Move::try_from).collect()
    }
}

impl TryFrom<char> for Move {
    type Error = TuringMachineError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'l' => Ok(Move::Left),
            'r' => Ok(Move::Right),
            '*' => Ok(Move::Stay),
            _ => Err(TuringMachineError::InvalidMove(c)),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// The lookup key of the transition table: a state plus the symbol under each head.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConfigKey {
    pub state: State,
    pub symbols: Vec<Symbol>,
}

/// What the machine does once a configuration key matched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    /// The state the machine transitions to.
    pub next_state: State,
    /// One symbol to write per tape.
    pub write: Vec<Symbol>,
    /// One head move per tape, applied after writing.
    pub moves: Vec<Move>,
}

/// Represents a single transition rule of a Turing Machine.
///
/// Declared transitions may contain [`WILDCARD`] in `read` or `write`; those are expanded
/// into concrete transitions before they reach the transition table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Transition {
    /// The state this transition leaves from.
    pub state: State,
    /// A vector of characters to be read from each tape.
    pub read: Vec<Symbol>,
    /// A vector of characters to be written to each tape.
    pub write: Vec<Symbol>,
    /// A vector of moves for each tape's head after the transition.
    pub moves: Vec<Move>,
    /// The next state the machine transitions to.
    pub next_state: State,
}

impl Transition {
    /// Builds a transition from the textual columns of a `.tm` transition line.
    ///
    /// Fails with [`TuringMachineError::InvalidMove`] on an unknown move character.
    pub fn from_parts(
        state: &str,
        read: &str,
        write: &str,
        moves: &str,
        next_state: &str,
    ) -> Result<Self, TuringMachineError> {
        Ok(Self {
            state: state.to_string(),
            read: read.chars().collect(),
            write: write.chars().collect(),
            moves: Move::parse_all(moves)?,
            next_state: next_state.to_string(),
        })
    }

    /// Returns true if any read or write symbol is the wildcard marker.
    pub fn is_wildcard(&self) -> bool {
        self.read.contains(&WILDCARD) || self.write.contains(&WILDCARD)
    }

    pub fn key(&self) -> ConfigKey {
        ConfigKey {
            state: self.state.clone(),
            symbols: self.read.clone(),
        }
    }

    pub fn action(&self) -> Action {
        Action {
            next_state: self.next_state.clone(),
            write: self.write.clone(),
            moves: self.moves.clone(),
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let read: String = self.read.iter().collect();
        let write: String = self.write.iter().collect();
        let moves: String = self.moves.iter().map(|m| m.as_char()).collect();
        write!(
            f,
            "{} {} {} {} {}",
            self.state, read, write, moves, self.next_state
        )
    }
}

/// The declared sets a machine is built from.
///
/// Produced by the parser and consumed read-only by everything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Every declared state name.
    pub states: BTreeSet<State>,
    /// Symbols an input string may contain.
    pub input_symbols: BTreeSet<Symbol>,
    /// Symbols the tapes may hold, including the blank symbol.
    pub tape_symbols: BTreeSet<Symbol>,
    /// The state the machine starts in.
    pub initial_state: State,
    /// The blank symbol.
    pub blank: Symbol,
    /// States in which the machine accepts.
    pub final_states: BTreeSet<State>,
    /// Number of tapes.
    pub tape_count: usize,
}

impl Vocabulary {
    pub fn is_final(&self, state: &str) -> bool {
        self.final_states.contains(state)
    }

    /// The symbols a wildcard stands for: every tape symbol except the blank.
    pub fn wildcard_symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.tape_symbols
            .iter()
            .copied()
            .filter(move |&symbol| symbol != self.blank)
    }
}

/// Lifecycle of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// The machine may still apply transitions.
    Running,
    /// The machine reached a final state.
    Accepted,
    /// No transition matched in a non-final state.
    Stopped,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        self != Status::Running
    }
}

/// Options for a single simulation run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Stop with [`TuringMachineError::StepLimitExceeded`] after this many transitions.
    /// `None` runs until the machine halts, however long that takes.
    #[serde(default)]
    pub step_limit: Option<usize>,
}

impl Config {
    pub fn with_step_limit(limit: usize) -> Self {
        Self {
            step_limit: Some(limit),
        }
    }
}

/// Coarse category of a [`TuringMachineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The machine description is malformed or inconsistent.
    Definition,
    /// The input contains an undeclared symbol.
    IllegalInput,
    /// The machine halted without accepting.
    NotAccepted,
    /// The run was cut off by the configured step limit.
    StepLimit,
    /// Reading a description from disk failed.
    File,
}

/// Represents various errors that can occur during Turing Machine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// Indicates an error during the parsing of a `.tm` description.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates an inconsistency between the declared sets and the transitions.
    #[error("Program validation error: {0}")]
    ValidationError(String),
    /// Two transitions share a configuration key but disagree on what to do.
    #[error("Duplicate transition for state '{state}' reading '{symbols}'")]
    DuplicateTransition { state: State, symbols: String },
    /// A transition's columns do not match the declared tape count.
    #[error(
        "Transition from state '{state}' expects {expected} tapes but has read={read}, write={write}, moves={moves}"
    )]
    ArityMismatch {
        state: State,
        expected: usize,
        read: usize,
        write: usize,
        moves: usize,
    },
    /// A move column contains something other than `l`, `r` or `*`.
    #[error("Invalid move '{0}', expected one of 'l', 'r', '*'")]
    InvalidMove(char),
    /// The input contains a symbol outside the input alphabet.
    #[error("Illegal input: '{symbol}' at position {position} was not declared in the set of input symbols")]
    IllegalInput { symbol: Symbol, position: usize },
    /// The machine halted in a non-final state.
    #[error("Input not accepted: halted in state '{state}' reading '{symbols}'")]
    NotAccepted {
        state: State,
        symbols: String,
        /// Tape 0 contents at the time the machine halted.
        result: String,
    },
    /// The configured step limit was reached while the machine could still move.
    #[error("Step limit of {0} exceeded")]
    StepLimitExceeded(usize),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
}

impl TuringMachineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TuringMachineError::ParseError(_)
            | TuringMachineError::ValidationError(_)
            | TuringMachineError::DuplicateTransition { .. }
            | TuringMachineError::ArityMismatch { .. }
            | TuringMachineError::InvalidMove(_) => ErrorKind::Definition,
            TuringMachineError::IllegalInput { .. } => ErrorKind::IllegalInput,
            TuringMachineError::NotAccepted { .. } => ErrorKind::NotAccepted,
            TuringMachineError::StepLimitExceeded(_) => ErrorKind::StepLimit,
            TuringMachineError::FileError(_) => ErrorKind::File,
        }
    }
}
