//! Data model shared by every pipeline stage.

mod item;
mod signal;

pub use item::{CanonicalItem, ProviderKind};
pub use signal::{SignalCategory, SignalType, UnifiedSignal};
