//! Transport abstraction (Telegram today; the shape leaves room for others).

pub mod port;
pub mod types;
