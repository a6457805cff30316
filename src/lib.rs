// Alpha-beta engine: rules via cozy-chess, search + protocol front end here
pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod search;
pub mod uci;

pub use board::{Position, Terminal};
pub use config::EngineConfig;
pub use engine::{Engine, SearchHandle};
pub use error::EngineError;
pub use search::{SearchParams, SearchResult};
