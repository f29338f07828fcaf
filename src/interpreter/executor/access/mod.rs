//! Member, index and static access.

pub mod index;
pub mod member;
pub mod qualified;
