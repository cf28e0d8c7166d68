//! # Therapy queue
//! Healing protocol per channel and a countdown player over the channels
//! that need attention.
//!
//! The player is a plain state machine; the caller drives `tick()` once per
//! second and owns whatever actually produces sound.

use serde::Serialize;

use crate::channel::{Channel, ChannelResult};

/// Tone and healing time recommended for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealingProtocol {
    pub channel: Channel,
    pub frequency_hz: u32,
    pub title: &'static str,
    pub healing_secs: u32,
}

pub const fn protocol(channel: Channel) -> HealingProtocol {
    let (frequency_hz, title, healing_secs) = match channel {
        Channel::Root => (396, "Root Chakra - Grounding", 300),
        Channel::Sacral => (417, "Sacral Chakra - Creativity", 360),
        Channel::SolarPlexus => (528, "Solar Plexus - Personal Power", 420),
        Channel::Heart => (639, "Heart Chakra - Love & Connection", 480),
        Channel::Throat => (741, "Throat Chakra - Expression", 300),
        Channel::ThirdEye => (852, "Third Eye - Intuition", 600),
        Channel::Crown => (963, "Crown Chakra - Spiritual Connection", 720),
    };
    HealingProtocol {
        channel,
        frequency_hz,
        title,
        healing_secs,
    }
}

/// `m:ss`, e.g. `300` → `"5:00"`.
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Ordered queue of unbalanced channels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TherapyPlan {
    steps: Vec<HealingProtocol>,
}

impl TherapyPlan {
    /// Non-Balanced channels, in result order.
    pub fn from_results(results: &[ChannelResult]) -> Self {
        Self {
            steps: results
                .iter()
                .filter(|r| !r.status.is_balanced())
                .map(|r| protocol(r.name))
                .collect(),
        }
    }

    pub fn steps(&self) -> &[HealingProtocol] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn total_secs(&self) -> u32 {
        self.steps.iter().map(|s| s.healing_secs).sum()
    }

    fn position(&self, channel: Channel) -> Option<usize> {
        self.steps.iter().position(|s| s.channel == channel)
    }
}

/// What happened on a `tick()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// Not playing; nothing changed.
    Idle,
    /// Still on the current step.
    Counting { remaining_secs: u32 },
    /// Moved on to the next queued channel.
    Advanced(Channel),
    /// Last step done; player stopped and rewound.
    Finished,
}

#[derive(Debug, Clone)]
pub struct TherapyPlayer {
    plan: TherapyPlan,
    index: usize,
    current: Option<HealingProtocol>,
    remaining_secs: u32,
    total_secs: u32,
}

impl TherapyPlayer {
    pub fn new(plan: TherapyPlan) -> Self {
        Self {
            plan,
            index: 0,
            current: None,
            remaining_secs: 0,
            total_secs: 0,
        }
    }

    pub fn plan(&self) -> &TherapyPlan {
        &self.plan
    }

    pub fn is_playing(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&HealingProtocol> {
        self.current.as_ref()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Begin with the first queued channel. `None` for an empty plan.
    pub fn start(&mut self) -> Option<&HealingProtocol> {
        let first = *self.plan.steps.first()?;
        self.index = 0;
        Some(self.load(first))
    }

    /// Play any channel; jumps the queue position if it is queued.
    pub fn play(&mut self, channel: Channel) -> &HealingProtocol {
        if let Some(i) = self.plan.position(channel) {
            self.index = i;
        }
        self.load(protocol(channel))
    }

    /// Jump to the next queued channel, if there is one.
    pub fn skip_next(&mut self) -> Option<&HealingProtocol> {
        let next = *self.plan.steps.get(self.index + 1)?;
        self.index += 1;
        Some(self.load(next))
    }

    pub fn stop(&mut self) {
        self.current = None;
        self.remaining_secs = 0;
        self.total_secs = 0;
    }

    /// One second elapsed.
    pub fn tick(&mut self) -> TickEvent {
        if self.current.is_none() || self.remaining_secs == 0 {
            return TickEvent::Idle;
        }
        if self.remaining_secs > 1 {
            self.remaining_secs -= 1;
            return TickEvent::Counting {
                remaining_secs: self.remaining_secs,
            };
        }
        match self.plan.steps.get(self.index + 1).copied() {
            Some(next) => {
                self.index += 1;
                self.load(next);
                TickEvent::Advanced(next.channel)
            }
            None => {
                self.stop();
                self.index = 0;
                TickEvent::Finished
            }
        }
    }

    /// Elapsed share of the current step in percent.
    pub fn progress_pct(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        f64::from(self.total_secs - self.remaining_secs) / f64::from(self.total_secs) * 100.0
    }

    fn load(&mut self, step: HealingProtocol) -> &HealingProtocol {
        self.remaining_secs = step.healing_secs;
        self.total_secs = step.healing_secs;
        self.current.insert(step)
    }
}
