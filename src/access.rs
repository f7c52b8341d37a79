//! Row access for expression evaluation.

pub mod tuple;

pub use tuple::Tuple;
