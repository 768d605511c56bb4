//! Parser, tolerance and check tests

mod parser;
mod tolerance;
