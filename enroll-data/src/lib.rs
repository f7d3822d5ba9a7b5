mod loader;

pub use loader::{PinRecord, PinTableError, PinTableLoader};
