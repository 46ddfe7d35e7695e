//! iscript_compiler: pipeline orchestration.
//!
//! Ties the stages together behind the two embeddable operations:
//! [`transpile`], a pure function from IndentScript source to JavaScript
//! text, and [`execute`], which transpiles and runs the result in the
//! embedded evaluator. [`Program`] coordinates multi-file runs for the CLI.
//!
//! The pipeline is strictly linear and synchronous: bytes → tokens → tree →
//! bytes, with a fresh scanner, parser and generator per invocation.

use bumpalo::Bump;
use iscript_diagnostics::ParseFailure;
use iscript_emitter::{EmitResult, Emitter};
use iscript_generator::Generator;
use iscript_parser::Parser;
use iscript_scanner::tokenize;
use std::fmt;
use std::path::{Path, PathBuf};

/// An error surfaced by the pipeline.
#[derive(Debug)]
pub enum CompileError {
    /// The parser rejected the source. Displayed as
    /// `IndentScript Error at line <N>: <detail>`.
    Parse(ParseFailure),
    /// The embedded evaluator rejected or aborted the generated script.
    Eval(iscript_evaluator::EvalError),
    /// Reading a source file or writing an output file failed.
    Io(std::io::Error),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Parse(e) => {
                write!(f, "IndentScript Error at line {}: {}", e.line, e.detail())
            }
            CompileError::Eval(e) => write!(f, "{}", e),
            CompileError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<std::io::Error> for CompileError {
    fn from(e: std::io::Error) -> Self {
        CompileError::Io(e)
    }
}

/// Transpile IndentScript source text to JavaScript text.
///
/// Pure: repeat invocations on the same source yield identical output.
pub fn transpile(source: &str) -> Result<String, CompileError> {
    let tokens = tokenize(source);
    let arena = Bump::new();
    let program = Parser::new(&arena, tokens)
        .parse_program()
        .map_err(CompileError::Parse)?;
    Ok(Generator::new().generate(&program))
}

/// Transpile source text, then run the result in the embedded evaluator.
/// Returns the completion value's display form; `console.log` output goes
/// to stdout as a side effect.
pub fn execute(source: &str) -> Result<String, CompileError> {
    let script = transpile(source)?;
    iscript_evaluator::evaluate(&script).map_err(CompileError::Eval)
}

/// A multi-file transpilation unit.
pub struct Program {
    /// The root file names.
    pub root_files: Vec<String>,
    /// Output directory override for emitted files.
    pub out_dir: Option<PathBuf>,
    /// Loaded sources as (file name, text) pairs.
    source_files: Vec<(String, String)>,
}

impl Program {
    /// Create a new program from root files.
    pub fn new(root_files: Vec<String>) -> Self {
        Self {
            root_files,
            out_dir: None,
            source_files: Vec::new(),
        }
    }

    /// Add an in-memory source file to the program.
    pub fn add_source(&mut self, file_name: String, source_text: String) {
        self.source_files.push((file_name, source_text));
    }

    /// Load all root files from disk.
    pub fn load_root_files(&mut self) -> Result<(), std::io::Error> {
        for file in &self.root_files.clone() {
            let content = std::fs::read_to_string(file)?;
            self.source_files.push((file.clone(), content));
        }
        Ok(())
    }

    /// Transpile every loaded source to JavaScript text, in load order.
    /// Stops at the first failing file; there is no partial output on
    /// failure.
    pub fn transpile_all(&self) -> Result<Vec<String>, CompileError> {
        self.source_files
            .iter()
            .map(|(_, source_text)| transpile(source_text))
            .collect()
    }

    /// Transpile every loaded source and build its emit result.
    pub fn emit(&self) -> Result<Vec<EmitResult>, CompileError> {
        let mut emitter = Emitter::new();
        emitter.out_dir = self.out_dir.clone();
        let scripts = self.transpile_all()?;
        Ok(self
            .source_files
            .iter()
            .zip(scripts)
            .map(|((file_name, _), script)| emitter.emit(Path::new(file_name), script))
            .collect())
    }

    /// Emit and write every output file to disk.
    pub fn write_output(&self) -> Result<Vec<EmitResult>, CompileError> {
        let results = self.emit()?;
        let emitter = Emitter::new();
        for result in &results {
            emitter.write_output_files(result)?;
        }
        Ok(results)
    }
}
