//! Driver model: clients, drivers, the bus that binds them, and device attributes.

pub mod attr;
pub mod bus;
pub mod client;
pub mod driver;
