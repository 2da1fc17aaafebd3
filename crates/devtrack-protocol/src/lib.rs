//! # devtrack-protocol
//!
//! Stream event types delivered to subscribers, and their JSON codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_stream_event, encode_stream_event, CodecError};
pub use messages::*;
