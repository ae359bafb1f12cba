pub mod dsp;
pub mod synth; // Single voice engine and its control surface

pub use synth::{
    config::{ConfigError, EngineConfig},
    message::{Gate, SynthMessage},
    params::{ParamId, ParamSet},
    voice::VoiceEngine,
};

#[cfg(feature = "rtrb")]
pub use synth::handle::{voice_channel, ControlError, SynthHandle};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MS_PER_SECOND: f32 = 1_000.0;
