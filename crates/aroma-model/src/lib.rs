//! # aroma-model
//!
//! Domain model for the Aroma notification platform.  The structs here are
//! the canonical in-memory representation of everything the store layer
//! persists: users, applications, messages, organizations, tokens, media,
//! activity events, reactions and mobile devices.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to the service layer, and so blob-persisted entities (events,
//! reactions, device sets) can be round-tripped through JSON columns.

pub mod enums;
pub mod events;
pub mod models;

pub use enums::*;
pub use events::*;
pub use models::*;
