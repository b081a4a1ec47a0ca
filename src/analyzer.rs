//! This module provides functions for analyzing Turing Machine definitions to detect common
//! errors and inconsistencies before execution. This includes checks for tape counts,
//! transition arity, the blank symbol, declared alphabets, and declared states.

use crate::table::TransitionTable;
use crate::types::{
    State, Symbol, Transition, TuringMachineError, Vocabulary, BLANK_SYMBOL, RESERVED_SYMBOLS,
    WILDCARD,
};
use std::collections::{BTreeSet, HashSet};

/// Represents various errors that can be found during the analysis of a machine definition.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// Indicates structural problems such as a zero tape count or no declared states.
    StructuralError(String),
    /// A transition's read, write and move columns do not all match the tape count.
    ArityMismatch {
        state: State,
        expected: usize,
        read: usize,
        write: usize,
        moves: usize,
    },
    /// The blank symbol is not `_`.
    InvalidBlank(Symbol),
    /// The blank symbol is missing from the tape alphabet.
    BlankNotInTapeSymbols(Symbol),
    /// Input symbols that are reserved, non-printable, or the blank symbol.
    InvalidInputSymbols(Vec<Symbol>),
    /// Tape symbols that are reserved or non-printable.
    InvalidTapeSymbols(Vec<Symbol>),
    /// Input symbols missing from the tape alphabet.
    InputSymbolsNotInTapeSymbols(Vec<Symbol>),
    /// Indicates that the initial state is not a declared state.
    InvalidStartState(String),
    /// Final states that are not declared states.
    UndefinedFinalStates(Vec<String>),
    /// States used by transitions but never declared.
    UndefinedStates(Vec<String>),
    /// Symbols used by transitions but missing from the tape alphabet.
    UndefinedTapeSymbols(Vec<Symbol>),
}

impl From<AnalysisError> for TuringMachineError {
    /// Converts an `AnalysisError` into a `TuringMachineError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::StructuralError(msg) => TuringMachineError::ValidationError(msg),
            AnalysisError::ArityMismatch {
                state,
                expected,
                read,
                write,
                moves,
            } => TuringMachineError::ArityMismatch {
                state,
                expected,
                read,
                write,
                moves,
            },
            AnalysisError::InvalidBlank(symbol) => TuringMachineError::ValidationError(format!(
                "Invalid blank symbol '{}', expected '{}'",
                symbol, BLANK_SYMBOL
            )),
            AnalysisError::BlankNotInTapeSymbols(symbol) => {
                TuringMachineError::ValidationError(format!(
                    "Blank symbol '{}' is not declared in the tape symbols",
                    symbol
                ))
            }
            AnalysisError::InvalidInputSymbols(symbols) => TuringMachineError::ValidationError(
                format!("Invalid input symbols: {:?}", symbols),
            ),
            AnalysisError::InvalidTapeSymbols(symbols) => TuringMachineError::ValidationError(
                format!("Invalid tape symbols: {:?}", symbols),
            ),
            AnalysisError::InputSymbolsNotInTapeSymbols(symbols) => {
                TuringMachineError::ValidationError(format!(
                    "Input symbols missing from the tape symbols: {:?}",
                    symbols
                ))
            }
            AnalysisError::InvalidStartState(state) => {
                TuringMachineError::ValidationError(format!("Invalid start state: {}", state))
            }
            AnalysisError::UndefinedFinalStates(states) => TuringMachineError::ValidationError(
                format!("Final states are not declared: {:?}", states),
            ),
            AnalysisError::UndefinedStates(states) => TuringMachineError::ValidationError(
                format!("Transitions reference undeclared states: {:?}", states),
            ),
            AnalysisError::UndefinedTapeSymbols(symbols) => {
                TuringMachineError::ValidationError(format!(
                    "Transitions reference undeclared tape symbols: {:?}",
                    symbols
                ))
            }
        }
    }
}

type Check = fn(&Vocabulary, &[Transition]) -> Result<(), AnalysisError>;

/// Analyzes a vocabulary and its declared transitions for structural and logical errors.
///
/// Checks run in a fixed order and the first failure is returned.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(TuringMachineError)` describing the first violated rule.
pub fn analyze(
    vocabulary: &Vocabulary,
    transitions: &[Transition],
) -> Result<(), TuringMachineError> {
    let checks: [Check; 7] = [
        check_structure,
        check_blank,
        check_symbols,
        check_valid_start_state,
        check_final_states,
        check_transition_states,
        check_transition_symbols,
    ];

    match checks
        .iter()
        .find_map(|check| check(vocabulary, transitions).err())
    {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

/// Returns the declared states that cannot be reached from the initial state, sorted.
///
/// Unreachable states are legal, so this is a diagnostic rather than a check.
pub fn unreachable_states(vocabulary: &Vocabulary, table: &TransitionTable) -> Vec<State> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue = vec![vocabulary.initial_state.as_str()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) {
            continue;
        }

        for action in table.actions(state) {
            if !visited.contains(action.next_state.as_str()) {
                queue.push(action.next_state.as_str());
            }
        }
    }

    vocabulary
        .states
        .iter()
        .filter(|state| !visited.contains(state.as_str()))
        .cloned()
        .collect()
}

/// Checks basic structural requirements: at least one tape, at least one state, and
/// transitions whose columns all match the tape count.
fn check_structure(
    vocabulary: &Vocabulary,
    transitions: &[Transition],
) -> Result<(), AnalysisError> {
    if vocabulary.tape_count == 0 {
        return Err(AnalysisError::StructuralError(
            "Tape count must be at least 1".to_string(),
        ));
    }

    if vocabulary.states.is_empty() {
        return Err(AnalysisError::StructuralError(
            "No states declared".to_string(),
        ));
    }

    let expected = vocabulary.tape_count;
    transitions
        .iter()
        .find(|t| {
            t.read.len() != expected || t.write.len() != expected || t.moves.len() != expected
        })
        .map_or(Ok(()), |t| {
            Err(AnalysisError::ArityMismatch {
                state: t.state.clone(),
                expected,
                read: t.read.len(),
                write: t.write.len(),
                moves: t.moves.len(),
            })
        })
}

/// Checks that the blank symbol is `_` and that it belongs to the tape alphabet.
fn check_blank(vocabulary: &Vocabulary, _: &[Transition]) -> Result<(), AnalysisError> {
    if vocabulary.blank != BLANK_SYMBOL {
        return Err(AnalysisError::InvalidBlank(vocabulary.blank));
    }

    if !vocabulary.tape_symbols.contains(&vocabulary.blank) {
        return Err(AnalysisError::BlankNotInTapeSymbols(vocabulary.blank));
    }

    Ok(())
}

/// Checks the declared alphabets: printable and not reserved, no blank in the input
/// alphabet, and every input symbol also a tape symbol.
fn check_symbols(vocabulary: &Vocabulary, _: &[Transition]) -> Result<(), AnalysisError> {
    let invalid_tape: Vec<Symbol> = vocabulary
        .tape_symbols
        .iter()
        .copied()
        .filter(|&symbol| !is_valid_symbol(symbol))
        .collect();
    if !invalid_tape.is_empty() {
        return Err(AnalysisError::InvalidTapeSymbols(invalid_tape));
    }

    let invalid_input: Vec<Symbol> = vocabulary
        .input_symbols
        .iter()
        .copied()
        .filter(|&symbol| !is_valid_symbol(symbol) || symbol == BLANK_SYMBOL)
        .collect();
    if !invalid_input.is_empty() {
        return Err(AnalysisError::InvalidInputSymbols(invalid_input));
    }

    let missing: Vec<Symbol> = vocabulary
        .input_symbols
        .difference(&vocabulary.tape_symbols)
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(AnalysisError::InputSymbolsNotInTapeSymbols(missing));
    }

    Ok(())
}

/// Checks whether the initial state is a declared state.
fn check_valid_start_state(
    vocabulary: &Vocabulary,
    _: &[Transition],
) -> Result<(), AnalysisError> {
    if !vocabulary.states.contains(&vocabulary.initial_state) {
        return Err(AnalysisError::InvalidStartState(
            vocabulary.initial_state.clone(),
        ));
    }

    Ok(())
}

/// Checks that every final state is a declared state.
fn check_final_states(vocabulary: &Vocabulary, _: &[Transition]) -> Result<(), AnalysisError> {
    let undefined: Vec<String> = vocabulary
        .final_states
        .difference(&vocabulary.states)
        .cloned()
        .collect();

    if !undefined.is_empty() {
        return Err(AnalysisError::UndefinedFinalStates(undefined));
    }

    Ok(())
}

/// Checks that transitions only leave from and lead to declared states.
fn check_transition_states(
    vocabulary: &Vocabulary,
    transitions: &[Transition],
) -> Result<(), AnalysisError> {
    let undefined: BTreeSet<String> = transitions
        .iter()
        .flat_map(|t| [&t.state, &t.next_state])
        .filter(|state| !vocabulary.states.contains(*state))
        .cloned()
        .collect();

    if !undefined.is_empty() {
        return Err(AnalysisError::UndefinedStates(undefined.into_iter().collect()));
    }

    Ok(())
}

/// Checks that transitions only read and write declared tape symbols or the wildcard.
fn check_transition_symbols(
    vocabulary: &Vocabulary,
    transitions: &[Transition],
) -> Result<(), AnalysisError> {
    let undefined: BTreeSet<Symbol> = transitions
        .iter()
        .flat_map(|t| t.read.iter().chain(&t.write))
        .copied()
        .filter(|&symbol| symbol != WILDCARD && !vocabulary.tape_symbols.contains(&symbol))
        .collect();

    if !undefined.is_empty() {
        return Err(AnalysisError::UndefinedTapeSymbols(
            undefined.into_iter().collect(),
        ));
    }

    Ok(())
}

fn is_valid_symbol(symbol: Symbol) -> bool {
    symbol.is_ascii_graphic() && !RESERVED_SYMBOLS.contains(&symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_vocabulary() -> Vocabulary {
        Vocabulary {
            states: ["q0", "q1", "accept"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            input_symbols: ['0', '1'].into_iter().collect(),
            tape_symbols: ['0', '1', '_'].into_iter().collect(),
            initial_state: "q0".to_string(),
            blank: '_',
            final_states: ["accept".to_string()].into_iter().collect(),
            tape_count: 1,
        }
    }

    fn transition(line: &str) -> Transition {
        let parts: Vec<&str> = line.split_whitespace().collect();
        Transition::from_parts(parts[0], parts[1], parts[2], parts[3], parts[4]).unwrap()
    }

    fn check(vocabulary: &Vocabulary, transitions: &[&str]) -> Result<(), TuringMachineError> {
        let transitions: Vec<Transition> = transitions.iter().map(|t| transition(t)).collect();
        analyze(vocabulary, &transitions)
    }

    #[test]
    fn test_valid_definition() {
        let vocabulary = create_test_vocabulary();
        let result = check(&vocabulary, &["q0 0 1 r q0", "q0 * * r q1", "q1 _ _ * accept"]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_zero_tapes() {
        let mut vocabulary = create_test_vocabulary();
        vocabulary.tape_count = 0;

        let result = check(&vocabulary, &[]);
        assert_eq!(
            result,
            Err(TuringMachineError::ValidationError(
                "Tape count must be at least 1".to_string()
            ))
        );
    }

    #[test]
    fn test_arity_mismatch() {
        let mut vocabulary = create_test_vocabulary();
        vocabulary.tape_count = 2;

        let result = check(&vocabulary, &["q0 00 1 rr q0"]);
        assert_eq!(
            result,
            Err(TuringMachineError::ArityMismatch {
                state: "q0".to_string(),
                expected: 2,
                read: 2,
                write: 1,
                moves: 2,
            })
        );
    }

    #[test]
    fn test_invalid_blank() {
        let mut vocabulary = create_test_vocabulary();
        vocabulary.blank = 'B';

        let error = check(&vocabulary, &[]).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Program validation error: Invalid blank symbol 'B', expected '_'"
        );
    }

    #[test]
    fn test_blank_missing_from_tape_symbols() {
        let mut vocabulary = create_test_vocabulary();
        vocabulary.tape_symbols.remove(&'_');

        let error = check(&vocabulary, &[]).unwrap_err();
        assert!(error.to_string().contains("not declared in the tape symbols"));
    }

    #[test]
    fn test_blank_in_input_symbols() {
        let mut vocabulary = create_test_vocabulary();
        vocabulary.input_symbols.insert('_');

        let error = check(&vocabulary, &[]).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Program validation error: Invalid input symbols: ['_']"
        );
    }

    #[test]
    fn test_reserved_tape_symbol() {
        let mut vocabulary = create_test_vocabulary();
        vocabulary.tape_symbols.insert('*');

        let error = check(&vocabulary, &[]).unwrap_err();
        assert!(error.to_string().contains("Invalid tape symbols: ['*']"));
    }

    #[test]
    fn test_input_symbols_not_in_tape_symbols() {
        let mut vocabulary = create_test_vocabulary();
        vocabulary.input_symbols.insert('a');

        let error = check(&vocabulary, &[]).unwrap_err();
        assert!(error.to_string().contains("['a']"));
    }

    #[test]
    fn test_invalid_start_state() {
        let mut vocabulary = create_test_vocabulary();
        vocabulary.initial_state = "start".to_string();

        let result = check(&vocabulary, &[]);
        assert_eq!(
            result,
            Err(TuringMachineError::ValidationError(
                "Invalid start state: start".to_string()
            ))
        );
    }

    #[test]
    fn test_undefined_final_states() {
        let mut vocabulary = create_test_vocabulary();
        vocabulary.final_states.insert("halt".to_string());

        let error = check(&vocabulary, &[]).unwrap_err();
        assert!(error.to_string().contains("[\"halt\"]"));
    }

    #[test]
    fn test_undefined_transition_states() {
        let vocabulary = create_test_vocabulary();

        let error = check(&vocabulary, &["q0 0 0 r q9", "q8 1 1 r q0"]).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Program validation error: Transitions reference undeclared states: [\"q8\", \"q9\"]"
        );
    }

    #[test]
    fn test_undefined_transition_symbols() {
        let vocabulary = create_test_vocabulary();

        let error = check(&vocabulary, &["q0 0 x r q0"]).unwrap_err();
        assert!(error.to_string().contains("['x']"));
    }

    #[test]
    fn test_unreachable_states() {
        let vocabulary = create_test_vocabulary();
        let mut table = TransitionTable::new();
        table.insert(transition("q0 0 0 r accept")).unwrap();

        assert_eq!(unreachable_states(&vocabulary, &table), vec!["q1"]);

        table.insert(transition("q0 1 1 r q1")).unwrap();
        assert!(unreachable_states(&vocabulary, &table).is_empty());
    }
}
