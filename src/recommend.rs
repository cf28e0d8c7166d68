//! Therapy advice derived from channel results.
//!
//! Underactive channels get their own fixed advisory pair; Overactive
//! channels get a generic cooling/grounding pair naming the channel.
//! Balanced channels contribute nothing. Output follows result order.

use crate::channel::{Channel, ChannelResult, Status};

/// Advisory pair for an Underactive channel.
pub const fn underactive_advice(channel: Channel) -> [&'static str; 2] {
    match channel {
        Channel::Root => [
            "Activate grounding motor in wristband for 5 minutes",
            "Play 396 Hz binaural beat for root chakra activation",
        ],
        Channel::Sacral => [
            "Play 417 Hz frequency for emotional healing",
            "Gentle warmth therapy for sacral region",
        ],
        Channel::SolarPlexus => [
            "Play 528 Hz tone for personal power activation",
            "Deep breathing exercises with yellow light visualization",
        ],
        Channel::Heart => [
            "Heart coherence breathing pattern (5 seconds in, 5 seconds out)",
            "Play 639 Hz frequency for heart opening",
        ],
        Channel::Throat => [
            "Humming vibration therapy for throat chakra",
            "Play 741 Hz frequency for expression enhancement",
        ],
        Channel::ThirdEye => [
            "Increase alpha wave stimulation through meditation",
            "Play 852 Hz frequency for intuition development",
        ],
        Channel::Crown => [
            "Deep theta meditation session recommended",
            "Play 963 Hz frequency for spiritual connection",
        ],
    }
}

/// Advisory pair for an Overactive channel.
pub fn overactive_advice(channel: Channel) -> [String; 2] {
    [
        format!("Balance {} chakra through gentle cooling therapy", channel.name()),
        "Reduce stimulation and practice grounding exercises".to_string(),
    ]
}

pub fn recommend(results: &[ChannelResult]) -> Vec<String> {
    let mut out = Vec::new();
    for r in results {
        match r.status {
            Status::Underactive => {
                out.extend(underactive_advice(r.name).iter().map(|s| s.to_string()))
            }
            Status::Overactive => out.extend(overactive_advice(r.name)),
            Status::Balanced => {}
        }
    }
    out
}
