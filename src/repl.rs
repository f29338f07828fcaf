//! Interactive read-eval-print loop.

use std::path::PathBuf;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::ast::StmtKind;
use crate::error;
use crate::interpreter::{Interpreter, Options, Value};
use crate::repl_common::{calculate_indent, needs_more_input};

const HISTORY_FILE: &str = ".lumen_history";
const FILENAME: &str = "<repl>";

pub struct Repl {
    interpreter: Interpreter,
    options: Options,
    history_file: PathBuf,
}

impl Repl {
    pub fn new(options: Options) -> Self {
        Self {
            interpreter: Self::fresh_interpreter(&options),
            options,
            history_file: Self::get_history_path(),
        }
    }

    fn fresh_interpreter(options: &Options) -> Interpreter {
        let mut interpreter = Interpreter::with_options(options.clone());
        interpreter.set_current_file(FILENAME);
        interpreter
    }

    fn get_history_path() -> PathBuf {
        match dirs::home_dir() {
            Some(home) => home.join(HISTORY_FILE),
            None => PathBuf::from(HISTORY_FILE),
        }
    }

    /// Run until end of input or `.exit`. Returns the process exit code.
    pub fn run(&mut self) -> i32 {
        let mut rl = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                eprintln!("{}: cannot start line editor: {}", "error".red(), e);
                return 1;
            }
        };
        // A missing history file is expected on first start.
        let _ = rl.load_history(&self.history_file);

        println!("{} {}", "Lumen".bold(), env!("CARGO_PKG_VERSION"));
        println!("Type \".help\" for available commands.\n");

        let mut buffer = String::new();
        let code = loop {
            let prompt = if buffer.is_empty() {
                ">>> ".to_string()
            } else {
                format!("... {}", " ".repeat(calculate_indent(&buffer)))
            };

            let line = match rl.readline(&prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    buffer.clear();
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break 0;
                }
                Err(e) => {
                    eprintln!("{}: {}", "error".red(), e);
                    break 1;
                }
            };

            if buffer.is_empty() {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed.starts_with('.') {
                    let _ = rl.add_history_entry(trimmed);
                    if !self.handle_command(trimmed, &mut rl) {
                        break 0;
                    }
                    continue;
                }
            }

            buffer.push_str(&line);
            buffer.push('\n');
            if needs_more_input(&buffer) {
                continue;
            }

            let source = std::mem::take(&mut buffer);
            let _ = rl.add_history_entry(source.trim_end());
            if let Some(code) = self.execute(&source) {
                break code;
            }
        };

        if let Err(e) = rl.save_history(&self.history_file) {
            tracing::warn!(
                path = %self.history_file.display(),
                error = %e,
                "could not save history"
            );
        }
        code
    }

    /// Returns false when the REPL should stop.
    fn handle_command(&mut self, line: &str, rl: &mut DefaultEditor) -> bool {
        let (command, argument) = match line.split_once(' ') {
            Some((command, argument)) => (command, argument.trim()),
            None => (line, ""),
        };
        match command {
            ".exit" | ".quit" => return false,
            ".help" => self.cmd_help(),
            ".vars" => self.cmd_vars(),
            ".history" => {
                for (i, entry) in rl.history().iter().enumerate() {
                    println!("{:4}  {}", i + 1, entry);
                }
            }
            ".clear" => {
                self.interpreter = Self::fresh_interpreter(&self.options);
                println!("Environment reset.");
            }
            ".load" if !argument.is_empty() => match std::fs::read_to_string(argument) {
                Ok(source) => {
                    crate::run(&source, argument, Some(&mut self.interpreter));
                    self.interpreter.set_current_file(FILENAME);
                }
                Err(e) => eprintln!("{}: cannot read '{}': {}", "error".red(), argument, e),
            },
            _ => println!(
                "Unknown command: {}. Type .help for available commands.",
                line
            ),
        }
        true
    }

    fn cmd_help(&self) {
        println!();
        println!("Lumen REPL Commands");
        println!();
        println!(".help          - Show this help message");
        println!(".vars          - List top-level bindings");
        println!(".history       - Show command history");
        println!(".clear         - Reset the environment");
        println!(".load <file>   - Load and execute a file");
        println!(".exit          - Exit the REPL");
    }

    fn cmd_vars(&self) {
        let globals = self.interpreter.globals();
        if globals.is_empty() {
            println!("No variables defined.");
            return;
        }
        for (name, value) in globals {
            println!("  {} = {}", name.cyan(), value.repr());
        }
    }

    /// Evaluate one complete input and echo the value of a trailing
    /// expression. Returns the exit code if the program called `exit`.
    fn execute(&mut self, source: &str) -> Option<i32> {
        let program = match crate::parse(source) {
            Ok(program) => program,
            Err(e) => {
                eprint!("{}", error::render(&e, source));
                return None;
            }
        };
        let echo = matches!(
            program.statements.last().map(|stmt| &stmt.kind),
            Some(StmtKind::Expression(_))
        );

        match self.interpreter.interpret(&program) {
            Ok(result) => {
                if let Some(code) = result.exit_code() {
                    return Some(code);
                }
                match result.last() {
                    Some(value) if echo && !matches!(value, Value::None) => {
                        println!("{}", value.repr())
                    }
                    _ => {}
                }
                None
            }
            Err(e) => {
                eprint!("{}", error::render(&e, source));
                None
            }
        }
    }
}
