//! This module provides the `ProgramLoader` struct, responsible for loading machine
//! descriptions from various sources, including files, directories, and strings.

use crate::definition::Definition;
use crate::parser::parse;
use crate::types::{TuringMachineError, MAX_PROGRAM_SIZE};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The extension of machine description files.
pub const PROGRAM_EXTENSION: &str = "tm";

/// `ProgramLoader` is a utility struct for loading machine descriptions.
/// It provides methods to load descriptions from individual files, from string content,
/// and to discover and load all `.tm` files within a specified directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single machine description from the specified file path.
    ///
    /// # Arguments
    ///
    /// * `path` - A reference to the `Path` of the `.tm` file to load.
    ///
    /// # Returns
    ///
    /// * `Ok(Definition)` if the file is successfully read and parsed.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read or exceeds
    ///   [`MAX_PROGRAM_SIZE`].
    /// * Any parse or validation error if the content is not a valid description.
    pub fn load_program(path: &Path) -> Result<Definition, TuringMachineError> {
        let metadata = fs::metadata(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;
        check_size(metadata.len(), path)?;

        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), bytes = content.len(), "loaded machine description");

        parse(&content)
    }

    /// Loads a single machine description from the provided string content.
    ///
    /// This is useful for parsing descriptions that are not stored in files, e.g., from user
    /// input.
    ///
    /// # Returns
    ///
    /// * `Ok(Definition)` if the content is successfully parsed.
    /// * `Err(TuringMachineError::FileError)` if the content exceeds [`MAX_PROGRAM_SIZE`].
    /// * Any parse or validation error if the content is not a valid description.
    pub fn load_program_from_string(content: &str) -> Result<Definition, TuringMachineError> {
        check_size(content.len() as u64, Path::new("<string>"))?;
        parse(content)
    }

    /// Loads every `.tm` file in a given directory.
    ///
    /// Directories and files with other extensions are skipped. Results are ordered by path.
    ///
    /// # Returns
    ///
    /// * `Vec<Result<(PathBuf, Definition), TuringMachineError>>` - one element per `.tm`
    ///   file holding its path and definition, or a `FileError` describing why it failed
    ///   to load.
    pub fn load_programs(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, Definition), TuringMachineError>> {
        if !directory.exists() {
            return vec![Err(TuringMachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths = Vec::new();
        let mut results = Vec::new();

        for entry in entries {
            match entry {
                Ok(entry) => paths.push(entry.path()),
                Err(e) => results.push(Err(TuringMachineError::FileError(format!(
                    "Failed to read directory entry: {}",
                    e
                )))),
            }
        }

        paths.sort();

        for path in paths {
            // Skip directories and non-.tm files
            if path.is_dir() || path.extension().is_none_or(|ext| ext != PROGRAM_EXTENSION) {
                debug!(path = %path.display(), "skipping non-program entry");
                continue;
            }

            results.push(match Self::load_program(&path) {
                Ok(definition) => Ok((path, definition)),
                Err(e) => Err(TuringMachineError::FileError(format!(
                    "Failed to load program from {}: {}",
                    path.display(),
                    e
                ))),
            });
        }

        results
    }
}

fn check_size(size: u64, path: &Path) -> Result<(), TuringMachineError> {
    if size > MAX_PROGRAM_SIZE as u64 {
        return Err(TuringMachineError::FileError(format!(
            "{} is {} bytes, larger than the {} byte limit",
            path.display(),
            size,
            MAX_PROGRAM_SIZE
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const VALID: &str = "#Q = {q0,halt}\n#S = {a}\n#G = {a,b,_}\n#q0 = q0\n#F = {halt}\n#N = 1\nq0 a b r halt\n";

    fn write_file(path: &Path, content: &str) {
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_valid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.tm");
        write_file(&file_path, VALID);

        let definition = ProgramLoader::load_program(&file_path).unwrap();
        assert_eq!(definition.initial_state(), "q0");
        assert!(definition.is_final("halt"));
        assert_eq!(definition.table().len(), 1);
    }

    #[test]
    fn test_load_invalid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("invalid.tm");
        write_file(&file_path, "This is not a valid program");

        let result = ProgramLoader::load_program(&file_path);
        assert!(matches!(result, Err(TuringMachineError::ParseError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();

        let error = ProgramLoader::load_program(&dir.path().join("missing.tm")).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::File);
    }

    #[test]
    fn test_load_oversized_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("large.tm");
        let padding = ";".repeat(MAX_PROGRAM_SIZE);
        write_file(&file_path, &format!("{VALID}{padding}"));

        let error = ProgramLoader::load_program(&file_path).unwrap_err();
        assert!(matches!(error, TuringMachineError::FileError(_)));
        assert!(error.to_string().contains("byte limit"));

        let error = ProgramLoader::load_program_from_string(&padding.repeat(2)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::File);
    }

    #[test]
    fn test_load_program_from_string() {
        let definition = ProgramLoader::load_program_from_string(VALID).unwrap();
        assert_eq!(definition.tape_count(), 1);
    }

    #[test]
    fn test_load_programs_from_directory() {
        let dir = tempdir().unwrap();

        write_file(&dir.path().join("valid.tm"), VALID);
        write_file(&dir.path().join("invalid.tm"), "This is not a valid program");
        // Non-.tm files are ignored
        write_file(&dir.path().join("ignored.txt"), "This file should be ignored");
        fs::create_dir(dir.path().join("nested.tm")).unwrap();

        let results = ProgramLoader::load_programs(dir.path());
        assert_eq!(results.len(), 2);

        // Sorted by path: invalid.tm before valid.tm
        assert!(matches!(results[0], Err(TuringMachineError::FileError(_))));
        let (path, definition) = results[1].as_ref().unwrap();
        assert!(path.ends_with("valid.tm"));
        assert_eq!(definition.initial_state(), "q0");
    }

    #[test]
    fn test_load_programs_from_missing_directory() {
        let dir = tempdir().unwrap();

        let results = ProgramLoader::load_programs(&dir.path().join("missing"));
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }
}
