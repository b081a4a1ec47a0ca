//! This module provides encoding functionality for converting machine definitions back into
//! `.tm` text, either as a canonical description or as a listing of the expanded
//! transition table.

use crate::definition::Definition;
use crate::types::Transition;
use std::fmt::Display;

/// Encodes a definition into a canonical `.tm` description.
///
/// Sets are written in sorted order and transitions in declaration order, wildcards
/// included. Parsing the output yields a definition equal to the input.
///
/// # Arguments
///
/// * `definition` - The Definition to encode.
///
/// # Returns
///
/// * `String` - The encoded description.
pub fn encode(definition: &Definition) -> String {
    let vocabulary = definition.vocabulary();

    let mut lines = vec![
        format!("#Q = {}", encode_set(&vocabulary.states)),
        format!("#S = {}", encode_set(&vocabulary.input_symbols)),
        format!("#G = {}", encode_set(&vocabulary.tape_symbols)),
        format!("#q0 = {}", vocabulary.initial_state),
        format!("#B = {}", vocabulary.blank),
        format!("#F = {}", encode_set(&vocabulary.final_states)),
        format!("#N = {}", vocabulary.tape_count),
    ];

    if !definition.transitions().is_empty() {
        lines.push(String::new());
        lines.extend(definition.transitions().iter().map(Transition::to_string));
    }

    lines.join("\n") + "\n"
}

/// Lists every concrete transition of the expanded table, one per line, ordered by state
/// and read symbols.
pub fn encode_table(definition: &Definition) -> String {
    definition
        .table()
        .transitions()
        .iter()
        .map(|transition| format!("{transition}\n"))
        .collect()
}

/// Encodes a set as `{a,b,c}`.
fn encode_set<'a, T, I>(items: I) -> String
where
    T: Display + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let items: Vec<String> = items.into_iter().map(ToString::to_string).collect();
    format!("{{{}}}", items.join(","))
}
