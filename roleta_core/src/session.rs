use crate::engine::{generate_spin, resolve, SpinOutcome};
use crate::items::ItemList;
use crate::rng::RotationSource;
use crate::sectors::{layout, Sector};

/// Caller-owned spin state: the accumulated rotation plus at most one
/// in-flight spin. The session does no timing itself; the embedding layer
/// schedules `settle` once the wheel's settle delay has elapsed.
#[derive(Debug, Default)]
pub struct WheelSession {
    rotation: f64,
    pending: Option<PendingSpin>,
}

/// An issued-but-unsettled spin, frozen at issue time. Resolution runs
/// against this snapshot, so the live item list may change mid-spin without
/// touching the in-flight outcome.
#[derive(Debug, Clone)]
struct PendingSpin {
    sectors: Vec<Sector>,
    target: f64,
}

impl WheelSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulated rotation in degrees. Advances only when a spin settles.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn is_spinning(&self) -> bool {
        self.pending.is_some()
    }

    /// Start a spin. Returns the new target rotation for the renderer to
    /// animate toward, or `None` when there is nothing to do: the list is
    /// empty, or a spin is already in flight (repeat requests are ignored,
    /// never queued).
    pub fn spin(&mut self, items: &ItemList, source: &mut impl RotationSource) -> Option<f64> {
        if self.pending.is_some() || items.is_empty() {
            return None;
        }
        let target = generate_spin(self.rotation, source);
        self.pending = Some(PendingSpin {
            sectors: layout(items),
            target,
        });
        Some(target)
    }

    /// Complete the pending spin: resolve the target against the sector
    /// snapshot taken at issue time and advance the accumulated rotation.
    pub fn settle(&mut self) -> Option<SpinOutcome> {
        let pending = self.pending.take()?;
        self.rotation = pending.target;
        let selected = resolve(pending.target, &pending.sectors)?.clone();
        Some(SpinOutcome {
            selected,
            rotation: pending.target,
        })
    }

    /// Drop the pending spin without resolving it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
