//! Lumen: a dynamically-typed, class-based scripting language with
//! optional type annotations.
//!
//! This is the library root that exports all modules.

#![allow(clippy::result_large_err)]
#![allow(clippy::new_without_default)]
#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]

pub mod ast;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod repl_common;
pub mod span;

use error::ScriptError;
use interpreter::{Interpreter, ProgramResult};

/// Run a Lumen program. Errors are rendered to stderr with their trace and
/// source excerpt; `None` means the program failed.
pub fn run(
    source: &str,
    filename: &str,
    interpreter: Option<&mut Interpreter>,
) -> Option<ProgramResult> {
    let mut fresh;
    let interpreter = match interpreter {
        Some(interpreter) => interpreter,
        None => {
            fresh = Interpreter::new();
            &mut fresh
        }
    };

    tracing::debug!(file = filename, bytes = source.len(), "running program");
    match interpreter.run(source, filename) {
        Ok(result) => Some(result),
        Err(error) => {
            tracing::debug!(error = %error, "program failed");
            eprint!("{}", error::render(&error, source));
            None
        }
    }
}

/// Parse source code into an AST without executing.
pub fn parse(source: &str) -> Result<ast::Program, ScriptError> {
    let tokens = lexer::Scanner::new(source).scan_tokens()?;
    let program = parser::Parser::new(tokens).parse()?;
    Ok(program)
}
