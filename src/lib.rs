//! This crate provides the core logic for a multi-tape Turing Machine simulator.
//! It includes modules for parsing `.tm` machine descriptions, validating them, expanding
//! wildcard transitions into a transition table, simulating runs on unbounded tapes, and
//! managing a collection of bundled machines.

pub mod analyzer;
pub mod definition;
pub mod encoder;
pub mod loader;
pub mod parser;
pub mod programs;
pub mod simulator;
pub mod table;
pub mod tape;
pub mod trace;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, unreachable_states, AnalysisError};
/// Re-exports the validated machine description.
pub use definition::Definition;
/// Re-exports the encoding functions from the encoder module.
pub use encoder::{encode, encode_table};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the `Simulator` struct from the simulator module.
pub use simulator::Simulator;
/// Re-exports the transition table and wildcard expansion.
pub use table::{expand, TransitionTable};
/// Re-exports the tape types.
pub use tape::{Tape, TapeBank};
/// Re-exports the run tracing types.
pub use trace::{Observer, Reporter, Snapshot, TapeSnapshot};
/// Re-exports various types related to machine definition and execution from the types module.
pub use types::{
    Action, Config, ConfigKey, ErrorKind, Move, Position, State, Status, Symbol, Transition,
    TuringMachineError, Vocabulary, BLANK_SYMBOL, MAX_EXPANDED_TRANSITIONS, MAX_PROGRAM_SIZE,
    WILDCARD,
};
