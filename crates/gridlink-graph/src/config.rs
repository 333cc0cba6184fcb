//! Network-wide settings.

use gridlink_core::ChannelMode;

/// Settings shared by every grid of a [`Network`](crate::Network).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Channel capacity mode. Default: [`ChannelMode::Default`].
    pub channel_mode: ChannelMode,
}
