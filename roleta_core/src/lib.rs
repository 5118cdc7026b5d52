pub mod engine;
pub mod items;
pub mod rng;
pub mod sectors;
pub mod session;

pub use crate::engine::{generate_spin, resolve, SpinOutcome, MIN_REVOLUTIONS, SETTLE_DURATION};
pub use crate::items::{Item, ItemList, WheelError, DEFAULT_WEIGHT};
pub use crate::rng::{seed_fingerprint, EntropySource, FixedSource, RotationSource, SeededSource};
pub use crate::sectors::{layout, Sector, FULL_TURN};
pub use crate::session::WheelSession;
