//! Enrollment state store and its persistence slots.

mod enrollment_store;
mod factory;
mod slot;

pub use enrollment_store::{EnrollmentStore, STORAGE_KEY};
pub use factory::{FileSlotFactory, MemorySlotFactory, SlotConfig, SlotFactory, SlotRegistry};
pub use slot::{AnswerSlot, FileSlot, MemorySlot, StoreError};
