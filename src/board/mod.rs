pub mod cozy;

pub use cozy::{Position, Terminal};
