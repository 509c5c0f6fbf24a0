//! Data model of the observed client
//!
//! Record layouts copied out of the foreign process and the offsets that
//! locate them for the known build.

mod actor;
mod layout;
mod local;

pub use actor::{ActorCommonData, INVALID_ID};
pub use layout::ObjectLayout;
pub use local::{LocalData, LocalDataHeader};
