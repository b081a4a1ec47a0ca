//! This module provides the transition table: the unique-key map from a configuration
//! (state plus the symbols under every head) to the action the machine takes, and the
//! expansion of wildcard transitions into the concrete transitions stored in it.

use crate::types::{
    Action, ConfigKey, State, Symbol, Transition, TuringMachineError, Vocabulary,
    MAX_EXPANDED_TRANSITIONS, WILDCARD,
};
use std::collections::{hash_map::Entry, BTreeSet, HashMap, VecDeque};
use tracing::debug;

/// Maps `(state, read symbols)` to an [`Action`].
///
/// Rules are grouped by state so that a lookup borrows the current state and symbols
/// instead of allocating a key on every step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
    rules: HashMap<State, HashMap<Vec<Symbol>, Action>>,
    len: usize,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from declared transitions, expanding wildcards first.
    ///
    /// The whole build fails on the first conflicting configuration key, so a partially
    /// filled table is never returned.
    pub fn build(
        transitions: &[Transition],
        vocabulary: &Vocabulary,
    ) -> Result<Self, TuringMachineError> {
        let mut table = Self::new();

        for transition in transitions {
            let within_limit = expansion_size(transition, vocabulary)
                .and_then(|size| size.checked_add(table.len()))
                .is_some_and(|total| total <= MAX_EXPANDED_TRANSITIONS);
            if !within_limit {
                return Err(TuringMachineError::ValidationError(format!(
                    "Transition '{}' expands beyond {} concrete transitions",
                    transition, MAX_EXPANDED_TRANSITIONS
                )));
            }

            if transition.is_wildcard() {
                let expanded = expand(transition, vocabulary);
                debug!(
                    transition = %transition,
                    count = expanded.len(),
                    "expanded wildcard transition"
                );
                for concrete in expanded {
                    table.insert(concrete)?;
                }
            } else {
                table.insert(transition.clone())?;
            }
        }

        Ok(table)
    }

    /// Records a concrete transition under its configuration key.
    ///
    /// Inserting the same action twice is a no-op. A different action for an existing key
    /// is rejected with [`TuringMachineError::DuplicateTransition`].
    pub fn insert(&mut self, transition: Transition) -> Result<(), TuringMachineError> {
        let ConfigKey { state, symbols } = transition.key();
        let action = transition.action();

        match self.rules.entry(state).or_default().entry(symbols) {
            Entry::Vacant(entry) => {
                entry.insert(action);
                self.len += 1;
                Ok(())
            }
            Entry::Occupied(entry) => {
                if *entry.get() == action {
                    Ok(())
                } else {
                    Err(TuringMachineError::DuplicateTransition {
                        state: transition.state,
                        symbols: entry.key().iter().collect(),
                    })
                }
            }
        }
    }

    /// Looks up the action for a configuration. `None` means the machine is stuck.
    pub fn get(&self, state: &str, symbols: &[Symbol]) -> Option<&Action> {
        self.rules.get(state)?.get(symbols)
    }

    pub fn contains(&self, state: &str, symbols: &[Symbol]) -> bool {
        self.get(state, symbols).is_some()
    }

    /// All actions leaving `state`, in no particular order.
    pub fn actions<'a>(&'a self, state: &str) -> impl Iterator<Item = &'a Action> + 'a {
        self.rules.get(state).into_iter().flat_map(HashMap::values)
    }

    /// Number of concrete transitions.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Every concrete transition, ordered by state and read symbols.
    pub fn transitions(&self) -> Vec<Transition> {
        let mut transitions: Vec<Transition> = self
            .rules
            .iter()
            .flat_map(|(state, by_symbols)| {
                by_symbols.iter().map(move |(read, action)| Transition {
                    state: state.clone(),
                    read: read.clone(),
                    write: action.write.clone(),
                    moves: action.moves.clone(),
                    next_state: action.next_state.clone(),
                })
            })
            .collect();
        transitions.sort();
        transitions
    }
}

/// Number of concrete transitions `transition` stands for, or `None` on overflow.
fn expansion_size(transition: &Transition, vocabulary: &Vocabulary) -> Option<usize> {
    let width = transition.read.len().max(transition.write.len());
    let positions = (0..width)
        .filter(|&i| is_wildcard_at(transition, i))
        .count();

    vocabulary
        .wildcard_symbols()
        .count()
        .checked_pow(u32::try_from(positions).ok()?)
}

/// Expands a wildcard transition into the set of concrete transitions it stands for.
///
/// The transition is treated as a template and resolved breadth-first, one tape position
/// at a time. At a position where both read and write hold the wildcard, each branch
/// substitutes the same symbol on both sides; where only one side holds it, only that side
/// is substituted. A wildcard stands for every non-blank tape symbol.
///
/// The result is ordered and free of duplicates, so it does not depend on the order in
/// which branches are explored. A transition without wildcards expands to itself.
pub fn expand(transition: &Transition, vocabulary: &Vocabulary) -> Vec<Transition> {
    let symbols: Vec<Symbol> = vocabulary.wildcard_symbols().collect();
    let mut queue = VecDeque::from([transition.clone()]);
    let mut expanded = BTreeSet::new();

    while let Some(partial) = queue.pop_front() {
        let Some(position) = first_wildcard(&partial) else {
            expanded.insert(partial);
            continue;
        };

        let read_wildcard = partial.read.get(position) == Some(&WILDCARD);
        let write_wildcard = partial.write.get(position) == Some(&WILDCARD);

        for &symbol in &symbols {
            let mut branch = partial.clone();
            if read_wildcard {
                branch.read[position] = symbol;
            }
            if write_wildcard {
                branch.write[position] = symbol;
            }
            queue.push_back(branch);
        }
    }

    expanded.into_iter().collect()
}

fn first_wildcard(transition: &Transition) -> Option<usize> {
    let width = transition.read.len().max(transition.write.len());
    (0..width).find(|&i| is_wildcard_at(transition, i))
}

fn is_wildcard_at(transition: &Transition, position: usize) -> bool {
    transition.read.get(position) == Some(&WILDCARD)
        || transition.write.get(position) == Some(&WILDCARD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Move, BLANK_SYMBOL};
    use proptest::prelude::*;

    fn vocabulary(tape_symbols: &str, tape_count: usize) -> Vocabulary {
        Vocabulary {
            states: ["q0", "q1"].iter().map(|s| s.to_string()).collect(),
            input_symbols: tape_symbols.chars().filter(|&c| c != BLANK_SYMBOL).collect(),
            tape_symbols: tape_symbols.chars().collect(),
            initial_state: "q0".to_string(),
            blank: BLANK_SYMBOL,
            final_states: ["q1".to_string()].into_iter().collect(),
            tape_count,
        }
    }

    fn transition(line: &str) -> Transition {
        let parts: Vec<&str> = line.split_whitespace().collect();
        Transition::from_parts(parts[0], parts[1], parts[2], parts[3], parts[4]).unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let mut table = TransitionTable::new();
        table.insert(transition("q0 1 0 r q1")).unwrap();

        let action = table.get("q0", &['1']).unwrap();
        assert_eq!(action.next_state, "q1");
        assert_eq!(action.write, vec!['0']);
        assert_eq!(action.moves, vec![Move::Right]);

        assert!(table.get("q0", &['0']).is_none());
        assert!(table.get("q1", &['1']).is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_identical_insert_is_collapsed() {
        let mut table = TransitionTable::new();
        table.insert(transition("q0 1 0 r q1")).unwrap();
        table.insert(transition("q0 1 0 r q1")).unwrap();

        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_conflicting_insert_is_rejected() {
        let mut table = TransitionTable::new();
        table.insert(transition("q0 1 0 r q1")).unwrap();

        let result = table.insert(transition("q0 1 1 r q1"));
        assert_eq!(
            result,
            Err(TuringMachineError::DuplicateTransition {
                state: "q0".to_string(),
                symbols: "1".to_string(),
            })
        );
        assert_eq!(table.get("q0", &['1']).unwrap().write, vec!['0']);
    }

    #[test]
    fn test_expand_read_and_write_wildcard() {
        let expanded = expand(&transition("q0 * * r q0"), &vocabulary("01_", 1));

        assert_eq!(
            expanded,
            vec![transition("q0 0 0 r q0"), transition("q0 1 1 r q0")]
        );
    }

    #[test]
    fn test_expand_read_only_wildcard() {
        let expanded = expand(&transition("q0 *_ 1_ rl q1"), &vocabulary("ab_", 2));

        assert_eq!(
            expanded,
            vec![transition("q0 a_ 1_ rl q1"), transition("q0 b_ 1_ rl q1")]
        );
    }

    #[test]
    fn test_expand_write_only_wildcard() {
        let expanded = expand(&transition("q0 a * * q1"), &vocabulary("ab_", 1));

        assert_eq!(
            expanded,
            vec![transition("q0 a a * q1"), transition("q0 a b * q1")]
        );
    }

    #[test]
    fn test_expand_skips_blank() {
        let expanded = expand(&transition("q0 * * * q0"), &vocabulary("x_", 1));

        assert_eq!(expanded, vec![transition("q0 x x * q0")]);
    }

    #[test]
    fn test_expand_multiple_positions() {
        let expanded = expand(&transition("q0 ** ** ll q0"), &vocabulary("01_", 2));

        assert_eq!(expanded.len(), 4);
        assert!(expanded.contains(&transition("q0 01 01 ll q0")));
        assert!(expanded.contains(&transition("q0 10 10 ll q0")));
        assert!(expanded.iter().all(|t| !t.is_wildcard()));
    }

    #[test]
    fn test_expand_concrete_transition_is_identity() {
        let concrete = transition("q0 01 10 r* q1");
        assert_eq!(expand(&concrete, &vocabulary("01_", 2)), vec![concrete]);
    }

    #[test]
    fn test_build_expands_wildcards() {
        let table = TransitionTable::build(
            &[transition("q0 * * r q0"), transition("q0 _ _ * q1")],
            &vocabulary("01_", 1),
        )
        .unwrap();

        assert_eq!(table.len(), 3);
        assert!(table.contains("q0", &['0']));
        assert!(table.contains("q0", &['1']));
        assert!(table.contains("q0", &['_']));
        assert_eq!(table.actions("q0").count(), 3);
    }

    #[test]
    fn test_build_accepts_agreeing_direct_and_wildcard() {
        let table = TransitionTable::build(
            &[transition("q0 1 1 r q0"), transition("q0 * * r q0")],
            &vocabulary("01_", 1),
        )
        .unwrap();

        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_build_rejects_direct_and_wildcard_conflict() {
        let result = TransitionTable::build(
            &[transition("q0 1 0 r q1"), transition("q0 * * r q0")],
            &vocabulary("01_", 1),
        );

        assert_eq!(
            result,
            Err(TuringMachineError::DuplicateTransition {
                state: "q0".to_string(),
                symbols: "1".to_string(),
            })
        );
    }

    #[test]
    fn test_build_rejects_ambiguous_write_wildcard() {
        // A write-only wildcard on a literal read yields one key with several outputs.
        let result = TransitionTable::build(&[transition("q0 _ * * q1")], &vocabulary("01_", 1));

        assert!(matches!(
            result,
            Err(TuringMachineError::DuplicateTransition { .. })
        ));
    }

    #[test]
    fn test_build_rejects_oversized_expansion() {
        // 10 symbols on 8 tapes would be 10^8 concrete transitions.
        let result = TransitionTable::build(
            &[transition("q0 ******** ******** ******** q1")],
            &vocabulary("0123456789_", 8),
        );

        assert!(matches!(
            result,
            Err(TuringMachineError::ValidationError(message)) if message.contains("65536")
        ));

        // Each transition fits on its own; together they do not.
        let vocabulary = vocabulary("0123456789abcdef_", 4);
        assert_eq!(
            expansion_size(&transition("q0 **** **** **** q1"), &vocabulary),
            Some(MAX_EXPANDED_TRANSITIONS)
        );
        let result = TransitionTable::build(
            &[transition("q1 0000 0000 **** q1"), transition("q0 **** **** **** q1")],
            &vocabulary,
        );
        assert!(matches!(result, Err(TuringMachineError::ValidationError(_))));
    }

    #[test]
    fn test_transitions_are_sorted() {
        let table = TransitionTable::build(
            &[transition("q1 _ _ * q1"), transition("q0 * * r q0")],
            &vocabulary("ba_", 1),
        )
        .unwrap();

        let listed: Vec<String> = table.transitions().iter().map(|t| t.to_string()).collect();
        assert_eq!(listed, vec!["q0 a a r q0", "q0 b b r q0", "q1 _ _ * q1"]);
    }

    fn column() -> impl Strategy<Value = (char, char)> {
        prop::sample::select(vec![
            ('a', 'a'),
            ('a', 'b'),
            ('_', 'c'),
            ('*', '*'),
            ('*', 'a'),
            ('b', '*'),
        ])
    }

    proptest! {
        /// Expansion agrees with a direct cartesian product computed right-to-left.
        #[test]
        fn prop_expand_matches_reverse_order_product(
            columns in prop::collection::vec(column(), 1..4),
        ) {
            let vocabulary = vocabulary("abc_", columns.len());
            let template = Transition {
                state: "q0".to_string(),
                read: columns.iter().map(|c| c.0).collect(),
                write: columns.iter().map(|c| c.1).collect(),
                moves: vec![Move::Stay; columns.len()],
                next_state: "q1".to_string(),
            };

            let mut expected = vec![template.clone()];
            for position in (0..columns.len()).rev() {
                let (read, write) = columns[position];
                if read != WILDCARD && write != WILDCARD {
                    continue;
                }
                expected = expected
                    .into_iter()
                    .flat_map(|partial| {
                        vocabulary.wildcard_symbols().map(move |symbol| {
                            let mut branch = partial.clone();
                            if read == WILDCARD {
                                branch.read[position] = symbol;
                            }
                            if write == WILDCARD {
                                branch.write[position] = symbol;
                            }
                            branch
                        })
                    })
                    .collect();
            }
            expected.sort();
            expected.dedup();

            let expanded = expand(&template, &vocabulary);
            prop_assert_eq!(&expanded, &expected);

            // Re-expanding concrete transitions changes nothing.
            for concrete in &expanded {
                prop_assert_eq!(expand(concrete, &vocabulary), vec![concrete.clone()]);
            }
        }
    }
}
