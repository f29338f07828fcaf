//! Invocation of functions, methods, natives and classes.

pub mod function;
