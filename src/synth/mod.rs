// Purpose: the single voice, its parameters, and the control surface that
// feeds it from another thread.

pub mod config;
#[cfg(feature = "rtrb")]
pub mod handle;
pub mod message;
pub mod params;
pub mod voice;
