//! Abstract syntax tree definitions for shell source.
//!
//! The parser produces this tree; visitors and transformers consume it. The
//! tree is strictly owned (each child has exactly one parent, no parent
//! links) and nodes are never mutated after construction except by
//! transformers, which build new trees and may move unchanged subtrees.
//!
//! Every node carries an optional [`ByteSpan`]. Equality of trees is
//! structural via [`structural_eq`], which ignores spans; renderers that
//! need to walk arbitrary nodes use the [`NodeRef`] reflection layer, which
//! exposes each node's abstract kind name and a manually maintained field
//! table.

mod ast;
mod describe;

pub use ast::*;
pub use describe::{Field, FieldValue, NodeKind, NodeRef, structural_eq};
pub use psh_position_tracking::ByteSpan;
