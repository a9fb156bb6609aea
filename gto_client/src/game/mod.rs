//! Game-tree data as exported by the solver.
//!
//! This module provides the typed view of a solver node:
//! - Board cards, roles and ranges ([`entities`])
//! - Grammar-driven parsers for the solver's text responses ([`parser`])

pub mod entities;
pub mod parser;

pub use entities::{ActionPath, ActionStrategy, Card, NodeData, PotStacks, RangeEntry, Role, RoleRange, Suit};
pub use parser::ParseError;
