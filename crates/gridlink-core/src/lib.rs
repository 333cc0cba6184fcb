//! Core types and contracts for the gridlink device network.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by the scheduler and the topology crates: typed ids,
//! spatial directions, colors, capability flags, the channel capacity
//! function, notifications, the owner/provider contracts, persisted node
//! fields, and the error enums.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod channel;
pub mod color;
pub mod direction;
pub mod error;
pub mod flags;
pub mod id;
pub mod owner;
pub mod record;

pub use channel::{max_channels, ChannelMode, DENSE_CABLE_CHANNELS, REGULAR_CABLE_CHANNELS};
pub use color::Color;
pub use direction::{Direction, DirectionSet, Location, Position};
pub use error::{CallableError, ConnectError, GridError};
pub use flags::{NodeFlag, NodeFlags};
pub use id::{ConnectionId, GridId, NodeId, StorageId, WorldId};
pub use owner::{Notification, NodeOwner, NodeProvider};
pub use record::{NodeRecord, UNSET_SECURITY_KEY};
