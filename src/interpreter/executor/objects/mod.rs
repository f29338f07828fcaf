//! Classes and instances.

pub mod classes;
