//! Provider adapters.
//!
//! Each tool's native records are plain serde structs gathered under the
//! [`ProviderPayload`] union; nothing provider-specific crosses into the
//! core past [`ProviderPayload::into_items`].

pub mod discord;
pub mod github;
pub mod linear;
pub mod notion;
pub mod payload;
pub mod slack;
pub mod traits;

pub use payload::{display_name, parse_date, parse_timestamp, ProviderPayload, KNOWN_TOOLS};
pub use traits::{FetchLimits, FileSource, SignalSource};
