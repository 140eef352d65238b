// Flag vocabularies.
//
// `FlagEffect` is the internal vocabulary the sequencer understands;
// `FeedFlag` is what external race-control feeds speak. The mapping is
// total so an auto-mode driver can forward every feed event.

use strum::{Display, EnumString};

/// A race-control flag with a defined light effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum FlagEffect {
    /// Track clear. Two-stage "go" sequence on session start, a plain
    /// half-brightness green afterwards.
    Green,
    /// Local hazard -- steady yellow.
    Yellow,
    /// Session stopped -- pulsing red settling to steady red.
    Red,
    /// Safety car deployed -- pulsing amber settling to steady amber.
    SafetyCar,
    /// Session complete -- white strobe, then back to the track-clear
    /// green so lights that miss later updates show current status.
    Checkered,
}

/// Flag vocabulary of the external race-control feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedFlag {
    Green,
    Yellow,
    Red,
    SafetyCar,
    VirtualSc,
    Checkered,
    Clear,
}

impl From<FeedFlag> for FlagEffect {
    fn from(feed: FeedFlag) -> Self {
        match feed {
            FeedFlag::Green | FeedFlag::Clear => Self::Green,
            FeedFlag::Yellow => Self::Yellow,
            FeedFlag::Red => Self::Red,
            FeedFlag::SafetyCar | FeedFlag::VirtualSc => Self::SafetyCar,
            FeedFlag::Checkered => Self::Checkered,
        }
    }
}
