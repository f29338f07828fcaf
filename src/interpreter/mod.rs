//! Interpreter module for Lumen.

pub mod builtins;
pub mod environment;
pub mod executor;
pub mod operators;
pub mod value;

pub use environment::{ContextId, Environment};
pub use executor::{Interpreter, Options, ProgramResult};
pub use value::Value;
