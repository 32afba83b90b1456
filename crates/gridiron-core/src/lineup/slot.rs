// Roster slot model for the classic nine-player format.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pool::player::Position;

/// A slot in the roster template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// Holds exactly the given position.
    Fixed(Position),
    /// Holds any flex-eligible position (RB, WR or TE).
    Flex,
}

impl SlotKind {
    /// Whether a player at `pos` may occupy this slot.
    pub fn accepts(&self, pos: Position) -> bool {
        match self {
            SlotKind::Fixed(p) => *p == pos,
            SlotKind::Flex => pos.is_flex_eligible(),
        }
    }

    pub fn eligible_positions(&self) -> &'static [Position] {
        match self {
            SlotKind::Fixed(Position::Quarterback) => &[Position::Quarterback],
            SlotKind::Fixed(Position::RunningBack) => &[Position::RunningBack],
            SlotKind::Fixed(Position::WideReceiver) => &[Position::WideReceiver],
            SlotKind::Fixed(Position::TightEnd) => &[Position::TightEnd],
            SlotKind::Fixed(Position::Defense) => &[Position::Defense],
            SlotKind::Flex => &[
                Position::RunningBack,
                Position::WideReceiver,
                Position::TightEnd,
            ],
        }
    }
}

/// Slot order: QB, RB, RB, WR, WR, WR, TE, FLEX, DST.
pub const ROSTER_TEMPLATE: [SlotKind; 9] = [
    SlotKind::Fixed(Position::Quarterback),
    SlotKind::Fixed(Position::RunningBack),
    SlotKind::Fixed(Position::RunningBack),
    SlotKind::Fixed(Position::WideReceiver),
    SlotKind::Fixed(Position::WideReceiver),
    SlotKind::Fixed(Position::WideReceiver),
    SlotKind::Fixed(Position::TightEnd),
    SlotKind::Flex,
    SlotKind::Fixed(Position::Defense),
];

/// Column labels matching `ROSTER_TEMPLATE`, used for exports.
pub const SLOT_LABELS: [&str; 9] = ["QB", "RB1", "RB2", "WR1", "WR2", "WR3", "TE", "FLEX", "DST"];

pub const LINEUP_SIZE: usize = ROSTER_TEMPLATE.len();

/// Where a rostered player sits: a dedicated slot for their position, or
/// the FLEX slot carrying the underlying position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineupSlot {
    Fixed(Position),
    Flex(Position),
}

impl LineupSlot {
    /// The position of the player in this slot.
    pub fn position(&self) -> Position {
        match self {
            LineupSlot::Fixed(p) | LineupSlot::Flex(p) => *p,
        }
    }

    pub fn is_flex(&self) -> bool {
        matches!(self, LineupSlot::Flex(_))
    }

    pub fn kind(&self) -> SlotKind {
        match self {
            LineupSlot::Fixed(p) => SlotKind::Fixed(*p),
            LineupSlot::Flex(_) => SlotKind::Flex,
        }
    }
}

impl fmt::Display for LineupSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineupSlot::Fixed(p) => write!(f, "{p}"),
            LineupSlot::Flex(p) => write!(f, "FLEX ({p})"),
        }
    }
}
