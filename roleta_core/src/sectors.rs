use crate::items::{Item, ItemList};
use serde::{Deserialize, Serialize};

pub const FULL_TURN: f64 = 360.0;

/// A contiguous angular slice of the wheel owned by one item.
/// The interval is half-open: a boundary angle belongs to the sector
/// starting there.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sector {
    pub item: Item,
    pub start_deg: f64,
    pub end_deg: f64,
}

impl Sector {
    pub fn span(&self) -> f64 {
        self.end_deg - self.start_deg
    }

    pub fn contains(&self, angle_deg: f64) -> bool {
        angle_deg >= self.start_deg && angle_deg < self.end_deg
    }
}

/// Partition the full circle into one sector per item, in list order,
/// starting at 0°, each spanning `360 * weight / total_weight` degrees.
///
/// Deterministic: the same list always yields bit-for-bit identical
/// boundaries. An empty list yields no sectors.
pub fn layout(items: &ItemList) -> Vec<Sector> {
    let total = items.total_weight();
    if total <= 0.0 {
        return Vec::new();
    }
    let mut sectors = Vec::with_capacity(items.len());
    let mut cumulative = 0.0;
    for item in items.iter() {
        let start = cumulative / total * FULL_TURN;
        cumulative += item.weight;
        let end = cumulative / total * FULL_TURN;
        sectors.push(Sector {
            item: item.clone(),
            start_deg: start,
            end_deg: end,
        });
    }
    sectors
}
