//! channel.rs: the seven output channels, their status, and per-channel results.
//!
//! Identity, display color, and status color are constants of the closed
//! `Channel` enum, so a lookup can never miss.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Output channel, declared in scoring/display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    Root,
    Sacral,
    SolarPlexus,
    Heart,
    Throat,
    ThirdEye,
    Crown,
}

impl Channel {
    pub const COUNT: usize = 7;

    /// Declaration order. Chart axes and therapy queues depend on it.
    pub const ALL: [Channel; Channel::COUNT] = [
        Channel::Root,
        Channel::Sacral,
        Channel::SolarPlexus,
        Channel::Heart,
        Channel::Throat,
        Channel::ThirdEye,
        Channel::Crown,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Identifier as shown to users and used in config keys.
    pub const fn name(self) -> &'static str {
        match self {
            Channel::Root => "Root",
            Channel::Sacral => "Sacral",
            Channel::SolarPlexus => "SolarPlexus",
            Channel::Heart => "Heart",
            Channel::Throat => "Throat",
            Channel::ThirdEye => "ThirdEye",
            Channel::Crown => "Crown",
        }
    }

    /// Fixed display color (hex).
    pub const fn color(self) -> &'static str {
        match self {
            Channel::Root => "#DC2626",
            Channel::Sacral => "#EA580C",
            Channel::SolarPlexus => "#CA8A04",
            Channel::Heart => "#16A34A",
            Channel::Throat => "#2563EB",
            Channel::ThirdEye => "#7C3AED",
            Channel::Crown => "#9333EA",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Discrete balance state derived from a channel score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Underactive,
    Balanced,
    Overactive,
}

impl Status {
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Underactive => "Underactive",
            Status::Balanced => "Balanced",
            Status::Overactive => "Overactive",
        }
    }

    /// Indicator color used next to the score bar.
    pub const fn color(self) -> &'static str {
        match self {
            Status::Underactive => "#DC2626",
            Status::Balanced => "#16A34A",
            Status::Overactive => "#CA8A04",
        }
    }

    pub fn is_balanced(self) -> bool {
        self == Status::Balanced
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scored channel. Created fresh per engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResult {
    pub name: Channel,
    /// Bio-Energy Score, rounded and clamped to `0..=100`.
    pub score: u8,
    pub status: Status,
    pub color: &'static str,
    pub status_color: &'static str,
}

impl ChannelResult {
    pub fn new(name: Channel, score: u8, status: Status) -> Self {
        Self {
            name,
            score,
            status,
            color: name.color(),
            status_color: status.color(),
        }
    }
}

/// Number of Balanced channels in a result set.
pub fn balanced_count(results: &[ChannelResult]) -> usize {
    results.iter().filter(|r| r.status.is_balanced()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn declaration_order_matches_index() {
        for (i, c) in Channel::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
        assert_eq!(Channel::ALL[0], Channel::Root);
        assert_eq!(Channel::ALL[6], Channel::Crown);
    }

    #[test]
    fn result_serialises_with_fixed_color() {
        let r = ChannelResult::new(Channel::ThirdEye, 64, Status::Balanced);
        let v = serde_json::to_value(r).unwrap();
        assert_eq!(
            v,
            json!({"name": "ThirdEye", "score": 64, "status": "Balanced", "color": "#7C3AED"})
        );
    }
}
