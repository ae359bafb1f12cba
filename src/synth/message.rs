#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::synth::params::ParamId;

/// Note gate transition. Both envelopes receive it at the same time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Gate {
    /// At least one key is held.
    Attack,
    /// All keys released.
    Release,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    Gate(Gate),
    /// Oscillator frequency in Hz. Leaves the envelopes alone.
    Frequency(f32),
    Param { id: ParamId, value: f32 },
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

/// Receiver for voices driven directly, with no control thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMessages;

impl MessageReceiver for NoMessages {
    fn pop(&mut self) -> Option<SynthMessage> {
        None
    }
}
