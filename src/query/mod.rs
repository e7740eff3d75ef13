//! Query-side processing.

pub mod expansion;

pub use expansion::{QueryExpander, SynonymDictionary};
