// In-progress lineup: slot assignment and the running salary budget.

use std::collections::HashSet;

use crate::lineup::slot::{LineupSlot, SlotKind, ROSTER_TEMPLATE};
use crate::lineup::{Lineup, LineupEntry};
use crate::pool::player::{Player, PlayerPool, Position};

/// How a step's salary ceiling is sized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Budget {
    /// A share of the full salary cap.
    CapShare(f64),
    /// A share of the budget still unspent.
    RemainingShare(f64),
    /// Everything not reserved for the other open slots.
    Headroom,
}

fn share_of(amount: u32, fraction: f64) -> u32 {
    (amount as f64 * fraction).floor() as u32
}

/// A single template slot and its occupant, if any.
#[derive(Debug, Clone)]
struct DraftSlot {
    kind: SlotKind,
    player: Option<Player>,
    /// Cheapest pool salary that could fill this slot.
    floor: u32,
}

/// A lineup being filled slot by slot.
///
/// Tracks the salary still available and hands out per-slot salary
/// ceilings that never grow from one pick to the next, and always leave
/// enough budget to fill every other open slot with its cheapest option.
#[derive(Debug, Clone)]
pub struct LineupDraft {
    slots: Vec<DraftSlot>,
    salary_cap: u32,
    spent: u32,
    last_ceiling: u32,
}

impl LineupDraft {
    pub fn new(salary_cap: u32, pool: &PlayerPool) -> Self {
        let slots = ROSTER_TEMPLATE
            .iter()
            .map(|kind| DraftSlot {
                kind: *kind,
                player: None,
                floor: pool.min_salary(kind.eligible_positions()).unwrap_or(0),
            })
            .collect();
        LineupDraft {
            slots,
            salary_cap,
            spent: 0,
            last_ceiling: salary_cap,
        }
    }

    pub fn salary_cap(&self) -> u32 {
        self.salary_cap
    }

    pub fn spent(&self) -> u32 {
        self.spent
    }

    pub fn remaining(&self) -> u32 {
        self.salary_cap.saturating_sub(self.spent)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.slots.iter().filter_map(|s| s.player.as_ref())
    }

    pub fn filled(&self) -> usize {
        self.players().count()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|s| s.player.is_some())
    }

    pub fn used_names(&self) -> HashSet<String> {
        self.players().map(|p| p.name.clone()).collect()
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.players().any(|p| p.name == name)
    }

    pub fn has_open(&self, kind: SlotKind) -> bool {
        self.open_index(kind).is_some()
    }

    /// Number of open slots of the given kind.
    pub fn open_count(&self, kind: SlotKind) -> usize {
        self.slots
            .iter()
            .filter(|s| s.kind == kind && s.player.is_none())
            .count()
    }

    fn open_index(&self, kind: SlotKind) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.kind == kind && s.player.is_none())
    }

    /// Budget that must stay unspent so every open slot other than `skip`
    /// can still be filled.
    fn reserve_excluding(&self, skip: usize) -> u32 {
        self.slots
            .iter()
            .enumerate()
            .filter(|(i, s)| *i != skip && s.player.is_none())
            .map(|(_, s)| s.floor)
            .sum()
    }

    /// The most the next `kind` pick may cost without starving the other
    /// open slots. Zero when no such slot is open.
    pub fn headroom(&self, kind: SlotKind) -> u32 {
        match self.open_index(kind) {
            Some(idx) => self.remaining().saturating_sub(self.reserve_excluding(idx)),
            None => 0,
        }
    }

    /// The slot a player at `pos` would take: the dedicated one if open,
    /// else FLEX for flex-eligible positions.
    pub fn slot_for(&self, pos: Position) -> Option<SlotKind> {
        let fixed = SlotKind::Fixed(pos);
        if self.has_open(fixed) {
            Some(fixed)
        } else if pos.is_flex_eligible() && self.has_open(SlotKind::Flex) {
            Some(SlotKind::Flex)
        } else {
            None
        }
    }

    /// Salary ceiling for the next pick into `kind`.
    ///
    /// Never exceeds the headroom for that slot. Shares of the remaining
    /// budget are also clamped to the last settled ceiling, so earlier
    /// slots always get at least as much room as later ones.
    pub fn ceiling(&self, kind: SlotKind, budget: Budget) -> u32 {
        let headroom = self.headroom(kind);
        match budget {
            Budget::CapShare(fraction) => share_of(self.salary_cap, fraction).min(headroom),
            Budget::RemainingShare(fraction) => share_of(self.remaining(), fraction)
                .min(headroom)
                .min(self.last_ceiling),
            Budget::Headroom => headroom,
        }
    }

    /// Record the ceiling a pick was made under.
    pub fn settle_ceiling(&mut self, ceiling: u32) {
        self.last_ceiling = self.last_ceiling.min(ceiling);
    }

    /// Place a player in their dedicated slot, falling back to FLEX.
    ///
    /// Returns the slot taken, or `None` if the player is already rostered,
    /// no compatible slot is open, or the salary does not fit.
    pub fn place(&mut self, player: &Player) -> Option<LineupSlot> {
        let kind = self.slot_for(player.position)?;
        self.place_in(kind, player)
    }

    /// Place a player in an open slot of exactly `kind`.
    pub fn place_in(&mut self, kind: SlotKind, player: &Player) -> Option<LineupSlot> {
        if !kind.accepts(player.position) || self.is_used(&player.name) {
            return None;
        }
        if player.salary > self.remaining() {
            return None;
        }
        let idx = self.open_index(kind)?;
        self.slots[idx].player = Some(player.clone());
        self.spent += player.salary;
        Some(match kind {
            SlotKind::Fixed(p) => LineupSlot::Fixed(p),
            SlotKind::Flex => LineupSlot::Flex(player.position),
        })
    }

    /// Finish the draft. `None` while any slot is still open.
    pub fn into_lineup(self) -> Option<Lineup> {
        let mut entries = Vec::with_capacity(self.slots.len());
        for slot in self.slots {
            let player = slot.player?;
            let assigned = match slot.kind {
                SlotKind::Fixed(p) => LineupSlot::Fixed(p),
                SlotKind::Flex => LineupSlot::Flex(player.position),
            };
            entries.push(LineupEntry {
                slot: assigned,
                player,
            });
        }
        Some(Lineup::new(entries))
    }
}
