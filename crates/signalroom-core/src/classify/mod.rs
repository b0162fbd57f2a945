//! Signal classification.
//!
//! - [`task`]: boolean behavioural flags for task items
//! - [`message`]: category + confidence for chat messages
//! - [`keywords`]: the keyword lists and the swappable matcher behind both

pub mod keywords;
pub mod message;
pub mod task;

pub use keywords::{KeywordMatcher, MatcherKind, SubstringMatcher, WordBoundaryMatcher};
pub use message::MessageClassifier;
pub use task::{classify, SignalClassifier, SignalFlags};
