mod factory;
mod slot;

pub use factory::SqliteSlotFactory;
pub use slot::SqliteSlot;
