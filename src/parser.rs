//! This module provides the parser for Turing Machine descriptions, utilizing the `pest` crate.
//! It defines the grammar for `.tm` files and functions to parse the input into a validated
//! `Definition`.

use crate::{
    definition::Definition,
    types::{State, Symbol, Transition, TuringMachineError, Vocabulary, BLANK_SYMBOL},
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::{BTreeSet, HashSet};

/// Derives a `PestParser` for the Turing Machine grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TuringMachineParser;

/// Parses the given input string into a validated `Definition`.
///
/// This is the main entry point for parsing `.tm` machine descriptions. The parsed
/// declarations are analyzed and expanded into a transition table before being returned.
///
/// # Arguments
///
/// * `input` - A string slice containing the machine description.
///
/// # Returns
///
/// * `Ok(Definition)` if the input is successfully parsed and validated.
/// * `Err(TuringMachineError::ParseError)` on syntax errors or duplicate declarations.
/// * `Err(TuringMachineError::InvalidMove)` on a move column outside `l`, `r`, `*`.
/// * Any error of [`Definition::new`] if the description is inconsistent.
pub fn parse(input: &str) -> Result<Definition, TuringMachineError> {
    let (vocabulary, transitions) = parse_declarations(input)?;
    Definition::new(vocabulary, transitions)
}

/// Parses the declarations and transitions of a description without validating them.
pub fn parse_declarations(
    input: &str,
) -> Result<(Vocabulary, Vec<Transition>), TuringMachineError> {
    let root = TuringMachineParser::parse(Rule::program, input)
        .map_err(|e| TuringMachineError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| TuringMachineError::ValidationError("Empty program".to_string()))?;

    parse_program(root)
}

/// Parses the top-level declarations and transitions from a `Pair<Rule::program>`.
///
/// Repeated `#Q`, `#S`, `#G` and `#F` declarations merge, and a repeated `#B` or `#N`
/// replaces the earlier value. Only `#q0` must be unique. `#B` defaults to `_` and `#F`
/// to the empty set; the others are required.
fn parse_program(pair: Pair<Rule>) -> Result<(Vocabulary, Vec<Transition>), TuringMachineError> {
    let mut states: Option<BTreeSet<State>> = None;
    let mut input_symbols: Option<BTreeSet<Symbol>> = None;
    let mut tape_symbols: Option<BTreeSet<Symbol>> = None;
    let mut initial_state: Option<State> = None;
    let mut blank: Option<Symbol> = None;
    let mut final_states: Option<BTreeSet<State>> = None;
    let mut tape_count: Option<usize> = None;
    let mut transitions = Vec::new();
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let rule = p.as_rule();

        check_unique_rule(rule, span, &mut seen)?;

        match rule {
            Rule::states => states.get_or_insert_with(BTreeSet::new).extend(parse_state_set(p)),
            Rule::input_symbols => input_symbols
                .get_or_insert_with(BTreeSet::new)
                .extend(parse_symbol_set(p)),
            Rule::tape_symbols => tape_symbols
                .get_or_insert_with(BTreeSet::new)
                .extend(parse_symbol_set(p)),
            Rule::initial_state => initial_state = Some(parse_inner_string(p)?),
            Rule::blank => blank = Some(parse_symbol(p)?),
            Rule::final_states => final_states
                .get_or_insert_with(BTreeSet::new)
                .extend(parse_state_set(p)),
            Rule::tape_count => tape_count = Some(parse_tape_count(p)?),
            Rule::transition => transitions.push(parse_transition(p)?),
            _ => {} // EOI
        }
    }

    let vocabulary = Vocabulary {
        states: check_required_rule(states, Rule::states)?,
        input_symbols: check_required_rule(input_symbols, Rule::input_symbols)?,
        tape_symbols: check_required_rule(tape_symbols, Rule::tape_symbols)?,
        initial_state: check_required_rule(initial_state, Rule::initial_state)?,
        blank: blank.unwrap_or(BLANK_SYMBOL),
        final_states: final_states.unwrap_or_default(),
        tape_count: check_required_rule(tape_count, Rule::tape_count)?,
    };

    Ok((vocabulary, transitions))
}

/// Parses a `{a,b,c}` set of state names.
fn parse_state_set(pair: Pair<Rule>) -> BTreeSet<State> {
    // Rule: (states | final_states) > state_set > [state]
    pair.into_inner()
        .flat_map(Pair::into_inner)
        .map(|state| state.as_str().to_string())
        .collect()
}

/// Parses a `{a,b,c}` set of single-character symbols.
fn parse_symbol_set(pair: Pair<Rule>) -> BTreeSet<Symbol> {
    // Rule: (input_symbols | tape_symbols) > symbol_set > [symbol]
    pair.into_inner()
        .flat_map(Pair::into_inner)
        .filter_map(|symbol| symbol.as_str().chars().next())
        .collect()
}

/// Parses a transition line: `state read write moves next-state`.
fn parse_transition(pair: Pair<Rule>) -> Result<Transition, TuringMachineError> {
    let span = pair.as_span();
    let columns: Vec<&str> = pair.into_inner().map(|p| p.as_str()).collect();

    let &[state, read, write, moves, next_state] = columns.as_slice() else {
        return Err(parse_error("Malformed transition", span));
    };

    Transition::from_parts(state, read, write, moves, next_state)
}

/// Parses the `#N` tape count.
fn parse_tape_count(pair: Pair<Rule>) -> Result<usize, TuringMachineError> {
    let span = pair.as_span();
    let count = parse_inner_string(pair)?;

    count
        .parse::<usize>()
        .map_err(|e| parse_error(&format!("Invalid tape count {count}: {e}"), span))
}

/// Parses the single symbol of a `#B` declaration.
fn parse_symbol(pair: Pair<Rule>) -> Result<Symbol, TuringMachineError> {
    let span = pair.as_span();

    parse_inner_string(pair)?
        .chars()
        .next()
        .ok_or_else(|| parse_error("Expected a symbol", span))
}

/// Extracts the string content of the first inner `Pair`.
fn parse_inner_string(pair: Pair<Rule>) -> Result<String, TuringMachineError> {
    let span = pair.as_span();

    pair.into_inner()
        .next()
        .map(|inner| inner.as_str().to_string())
        .ok_or_else(|| parse_error("Expected a value", span))
}

/// Creates a `TuringMachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Checks if a single-valued declaration has already been seen. Only `#q0` counts.
fn check_unique_rule(
    rule: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), TuringMachineError> {
    if rule != Rule::initial_state {
        return Ok(());
    }

    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{}\" declaration", flag(rule)),
            span,
        ));
    }

    Ok(())
}

/// Checks if a required declaration is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, rule: Rule) -> Result<T, TuringMachineError> {
    value.ok_or_else(|| {
        TuringMachineError::ValidationError(format!("Missing '{}' section", flag(rule)))
    })
}

/// The `#` flag that introduces a declaration.
fn flag(rule: Rule) -> &'static str {
    match rule {
        Rule::states => "#Q",
        Rule::input_symbols => "#S",
        Rule::tape_symbols => "#G",
        Rule::initial_state => "#q0",
        Rule::blank => "#B",
        Rule::final_states => "#F",
        Rule::tape_count => "#N",
        _ => "?",
    }
}
