//! Control flow and keyword evaluation.

pub mod branching;
pub mod lambdas;
pub mod loops;
pub mod this_super;
