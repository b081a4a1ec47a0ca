//! A validated machine: the declared vocabulary, the transitions as written, and the
//! transition table they expand into.

use crate::analyzer::{analyze, unreachable_states};
use crate::table::TransitionTable;
use crate::types::{State, Symbol, Transition, TuringMachineError, Vocabulary};
use serde::Serialize;
use tracing::{debug, warn};

/// An immutable, fully validated machine description.
///
/// A `Definition` can only be built through [`Definition::new`] (or the parser), so every
/// instance has passed analysis and has a conflict-free transition table. It can back any
/// number of simulations.
#[derive(Debug, Clone, Serialize)]
pub struct Definition {
    vocabulary: Vocabulary,
    /// The transitions as declared, wildcards included.
    transitions: Vec<Transition>,
    #[serde(skip)]
    table: TransitionTable,
}

impl Definition {
    /// Validates the vocabulary against the transitions and builds the transition table.
    ///
    /// # Returns
    ///
    /// * `Ok(Definition)` if every check passes.
    /// * `Err(TuringMachineError::ValidationError)` or `ArityMismatch` on an inconsistent
    ///   description.
    /// * `Err(TuringMachineError::DuplicateTransition)` if two transitions, after wildcard
    ///   expansion, disagree on the same configuration.
    pub fn new(
        vocabulary: Vocabulary,
        transitions: Vec<Transition>,
    ) -> Result<Self, TuringMachineError> {
        analyze(&vocabulary, &transitions)?;
        let table = TransitionTable::build(&transitions, &vocabulary)?;

        for state in unreachable_states(&vocabulary, &table) {
            warn!(state = %state, "state is unreachable from the initial state");
        }

        debug!(
            states = vocabulary.states.len(),
            tapes = vocabulary.tape_count,
            declared = transitions.len(),
            expanded = table.len(),
            "built machine definition"
        );

        Ok(Self {
            vocabulary,
            transitions,
            table,
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// The transitions as declared, in declaration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// The expanded, concrete transition table.
    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn initial_state(&self) -> &str {
        &self.vocabulary.initial_state
    }

    pub fn blank(&self) -> Symbol {
        self.vocabulary.blank
    }

    pub fn tape_count(&self) -> usize {
        self.vocabulary.tape_count
    }

    pub fn is_final(&self, state: &str) -> bool {
        self.vocabulary.is_final(state)
    }

    pub fn is_input_symbol(&self, symbol: Symbol) -> bool {
        self.vocabulary.input_symbols.contains(&symbol)
    }

    /// Declared states in sorted order.
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.vocabulary.states.iter()
    }
}

impl PartialEq for Definition {
    fn eq(&self, other: &Self) -> bool {
        self.vocabulary == other.vocabulary && self.table == other.table
    }
}

impl Eq for Definition {}
