//! Sample machines bundled with the crate, parsed once on first use.

use crate::definition::Definition;
use crate::parser::parse;
use crate::types::TuringMachineError;
use tracing::warn;

// Default embedded programs
const PROGRAM_TEXTS: [(&str, &str); 4] = [
    (
        "unary-increment",
        include_str!("../programs/unary-increment.tm"),
    ),
    (
        "binary-increment",
        include_str!("../programs/binary-increment.tm"),
    ),
    ("copy", include_str!("../programs/copy.tm")),
    ("palindrome", include_str!("../programs/palindrome.tm")),
];

/// A bundled machine together with its source text.
#[derive(Debug, Clone)]
pub struct BundledProgram {
    pub name: &'static str,
    pub text: &'static str,
    pub definition: Definition,
}

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<BundledProgram> = PROGRAM_TEXTS
        .iter()
        .filter_map(|&(name, text)| match parse(text) {
            Ok(definition) => Some(BundledProgram { name, text, definition }),
            Err(e) => {
                warn!(program = name, error = %e, "failed to parse bundled program");
                None
            }
        })
        .collect();
}

/// Summary of a bundled program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub initial_state: String,
    pub state_count: usize,
    /// Transitions as declared, wildcards included.
    pub transition_count: usize,
    /// Concrete transitions after wildcard expansion.
    pub expanded_count: usize,
    pub tape_count: usize,
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Definition, TuringMachineError> {
        PROGRAMS
            .get(index)
            .map(|program| program.definition.clone())
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Program index {} out of range", index))
            })
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<Definition, TuringMachineError> {
        Self::find(name).map(|program| program.definition.clone())
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        PROGRAMS
            .iter()
            .map(|program| program.name.to_string())
            .collect()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, TuringMachineError> {
        let program = PROGRAMS.get(index).ok_or_else(|| {
            TuringMachineError::ValidationError(format!("Program index {} out of range", index))
        })?;
        let definition = &program.definition;

        Ok(ProgramInfo {
            index,
            name: program.name.to_string(),
            initial_state: definition.initial_state().to_string(),
            state_count: definition.vocabulary().states.len(),
            transition_count: definition.transitions().len(),
            expanded_count: definition.table().len(),
            tape_count: definition.tape_count(),
        })
    }

    /// Search for programs by name
    pub fn search_programs(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        PROGRAMS
            .iter()
            .enumerate()
            .filter(|(_, program)| program.name.contains(&query))
            .map(|(index, _)| index)
            .collect()
    }

    /// Get the source text of a program by its name
    pub fn get_program_text_by_name(name: &str) -> Result<&'static str, TuringMachineError> {
        Self::find(name).map(|program| program.text)
    }

    fn find(name: &str) -> Result<&'static BundledProgram, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|program| program.name == name)
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Program '{}' not found", name))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::Simulator;

    fn run(name: &str, input: &str) -> Result<String, TuringMachineError> {
        let definition = ProgramManager::get_program_by_name(name)?;
        Simulator::of(definition, input)?.run()
    }

    #[test]
    fn test_all_programs_are_valid() {
        assert_eq!(ProgramManager::get_program_count(), PROGRAM_TEXTS.len());

        for (name, text) in PROGRAM_TEXTS {
            assert!(parse(text).is_ok(), "{name} failed to parse");
        }
    }

    #[test]
    fn test_program_names() {
        assert_eq!(
            ProgramManager::list_program_names(),
            vec!["unary-increment", "binary-increment", "copy", "palindrome"]
        );
    }

    #[test]
    fn test_unary_increment() {
        assert_eq!(run("unary-increment", "111"), Ok("1111".to_string()));
        assert_eq!(run("unary-increment", ""), Ok("1".to_string()));
    }

    #[test]
    fn test_binary_increment() {
        assert_eq!(run("binary-increment", "1011"), Ok("1100".to_string()));
        assert_eq!(run("binary-increment", "111"), Ok("1000".to_string()));
        assert_eq!(run("binary-increment", "0"), Ok("1".to_string()));
    }

    #[test]
    fn test_copy() {
        assert_eq!(run("copy", "abab"), Ok("abab".to_string()));
    }

    #[test]
    fn test_palindrome() {
        assert_eq!(run("palindrome", "101"), Ok("101".to_string()));
        assert_eq!(run("palindrome", "0110"), Ok("0110".to_string()));
        assert_eq!(run("palindrome", ""), Ok(String::new()));
        assert!(matches!(
            run("palindrome", "10"),
            Err(TuringMachineError::NotAccepted { .. })
        ));
        assert!(matches!(
            run("palindrome", "12"),
            Err(TuringMachineError::IllegalInput { position: 1, .. })
        ));
    }

    #[test]
    fn test_program_manager_get_program_by_index() {
        let definition = ProgramManager::get_program_by_index(0).unwrap();
        assert_eq!(definition.initial_state(), "q0");

        assert!(ProgramManager::get_program_by_index(99).is_err());
    }

    #[test]
    fn test_program_manager_get_program_by_name() {
        assert!(ProgramManager::get_program_by_name("copy").is_ok());

        let error = ProgramManager::get_program_by_name("missing").unwrap_err();
        assert_eq!(
            error.to_string(),
            "Program validation error: Program 'missing' not found"
        );
    }

    #[test]
    fn test_program_manager_get_program_info() {
        let info = ProgramManager::get_program_info(3).unwrap();

        assert_eq!(
            info,
            ProgramInfo {
                index: 3,
                name: "palindrome".to_string(),
                initial_state: "copy".to_string(),
                state_count: 4,
                transition_count: 9,
                expanded_count: 13,
                tape_count: 2,
            }
        );
    }

    #[test]
    fn test_program_manager_search_programs() {
        assert_eq!(ProgramManager::search_programs("INCREMENT"), vec![0, 1]);
        assert!(ProgramManager::search_programs("busy").is_empty());
    }

    #[test]
    fn test_program_text_by_name() {
        let text = ProgramManager::get_program_text_by_name("copy").unwrap();
        assert!(text.contains("#N = 2"));
    }
}
