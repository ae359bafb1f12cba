use rtrb::{Consumer, Producer, RingBuffer};

use crate::synth::{
    config::EngineConfig,
    message::{Gate, SynthMessage},
    params::{ParamError, ParamId},
    voice::VoiceEngine,
};

/// Default capacity of the control ring, in messages.
pub const CONTROL_QUEUE_SIZE: usize = 256;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ControlError {
    #[error("control queue is full, message dropped")]
    QueueFull,
    #[error("value for {target} is not finite")]
    NonFinite { target: &'static str },
    #[error(transparent)]
    Param(#[from] ParamError),
}

/// Build a voice and the handle that controls it from another thread.
pub fn voice_channel(
    config: EngineConfig,
    capacity: usize,
) -> (VoiceEngine<Consumer<SynthMessage>>, SynthHandle) {
    let (tx, rx) = RingBuffer::<SynthMessage>::new(capacity);
    (VoiceEngine::with_receiver(config, rx), SynthHandle { tx })
}

/// Control-thread side of a voice. Every call is non-blocking: when the
/// ring is full the message is dropped and `QueueFull` is returned.
pub struct SynthHandle {
    tx: Producer<SynthMessage>,
}

impl SynthHandle {
    pub fn gate(&mut self, gate: Gate) -> Result<(), ControlError> {
        self.push(SynthMessage::Gate(gate))
    }

    pub fn set_frequency(&mut self, hz: f32) -> Result<(), ControlError> {
        if !hz.is_finite() {
            return Err(ControlError::NonFinite { target: "frequency" });
        }
        self.push(SynthMessage::Frequency(hz.max(0.0)))
    }

    /// Retune and open the gate. Both messages are queued, or neither is.
    pub fn note_on(&mut self, hz: f32) -> Result<(), ControlError> {
        if self.tx.slots() < 2 {
            tracing::warn!(hz, "control queue full, note dropped");
            return Err(ControlError::QueueFull);
        }
        self.set_frequency(hz)?;
        self.gate(Gate::Attack)
    }

    pub fn note_off(&mut self) -> Result<(), ControlError> {
        self.gate(Gate::Release)
    }

    /// Set a parameter by path, `"filter.cutoff"` or `["filter", "cutoff"]`
    /// style. Unknown paths are reported and otherwise ignored.
    pub fn set_param(&mut self, path: &str, value: f32) -> Result<(), ControlError> {
        let id = path.parse::<ParamId>().map_err(|err| {
            tracing::debug!(%err, "ignoring parameter update");
            err
        })?;
        self.set_param_id(id, value)
    }

    pub fn set_param_path<S: AsRef<str>>(
        &mut self,
        path: &[S],
        value: f32,
    ) -> Result<(), ControlError> {
        let id = ParamId::from_path(path).map_err(|err| {
            tracing::debug!(%err, "ignoring parameter update");
            err
        })?;
        self.set_param_id(id, value)
    }

    /// Clamp to the legal range (with a warning) and queue.
    pub fn set_param_id(&mut self, id: ParamId, value: f32) -> Result<(), ControlError> {
        if !value.is_finite() {
            tracing::warn!(param = %id, value, "rejecting non-finite parameter value");
            return Err(ControlError::NonFinite { target: "parameter" });
        }

        let clamped = id.clamp(value);
        if clamped != value {
            tracing::warn!(param = %id, value, clamped, "parameter clamped to legal range");
        }
        self.push(SynthMessage::Param { id, value: clamped })
    }

    fn push(&mut self, msg: SynthMessage) -> Result<(), ControlError> {
        self.tx.push(msg).map_err(|_| {
            tracing::warn!(?msg, "control queue full, message dropped");
            ControlError::QueueFull
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::params::EnvField;

    #[test]
    fn messages_apply_on_next_block() {
        let (mut voice, mut handle) = voice_channel(EngineConfig::default(), 16);
        handle.set_param("ampEnvelope.sustain", 0.25).unwrap();
        handle.note_on(220.0).unwrap();

        // Nothing changes until the voice renders.
        assert_eq!(voice.params().amp_envelope.sustain, 0.5);
        assert_eq!(voice.frequency(), 0.0);

        let mut buffer = vec![0.0f32; 128];
        voice.render_block(&mut buffer);
        assert_eq!(voice.params().amp_envelope.sustain, 0.25);
        assert_eq!(voice.frequency(), 220.0);
    }

    #[test]
    fn unknown_path_is_an_error_and_queues_nothing() {
        let (mut voice, mut handle) = voice_channel(EngineConfig::default(), 16);
        let err = handle.set_param("lfo.rate", 3.0).unwrap_err();
        assert!(matches!(err, ControlError::Param(ParamError::UnknownGroup(_))));

        let before = *voice.params();
        voice.render_block(&mut [0.0f32; 64]);
        assert_eq!(*voice.params(), before);
    }

    #[test]
    fn path_segments_are_accepted() {
        let (mut voice, mut handle) = voice_channel(EngineConfig::default(), 16);
        handle
            .set_param_path(&["filter_envelope", "release"], 300.0)
            .unwrap();
        voice.render_block(&mut [0.0f32; 64]);
        assert_eq!(voice.params().filter_envelope.release, 300.0);
    }

    #[test]
    fn out_of_range_values_are_clamped_before_queueing() {
        let (mut voice, mut handle) = voice_channel(EngineConfig::default(), 16);
        handle
            .set_param_id(ParamId::AmpEnvelope(EnvField::Attack), -10.0)
            .unwrap();
        handle.set_param("filter.resonance", 0.0).unwrap();
        voice.render_block(&mut [0.0f32; 64]);
        assert_eq!(voice.params().amp_envelope.attack, 0.0);
        assert!(voice.params().filter.resonance > 0.0);
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let (_voice, mut handle) = voice_channel(EngineConfig::default(), 16);
        assert!(matches!(
            handle.set_param("osc.clip", f32::INFINITY),
            Err(ControlError::NonFinite { .. })
        ));
        assert!(handle.set_frequency(f32::NAN).is_err());
    }

    #[test]
    fn full_queue_drops_without_blocking() {
        let (_voice, mut handle) = voice_channel(EngineConfig::default(), 2);
        handle.gate(Gate::Attack).unwrap();
        handle.gate(Gate::Release).unwrap();
        assert_eq!(handle.gate(Gate::Attack), Err(ControlError::QueueFull));
        assert_eq!(handle.note_on(440.0), Err(ControlError::QueueFull));
    }

    #[test]
    fn note_on_is_all_or_nothing() {
        let (mut voice, mut handle) = voice_channel(EngineConfig::default(), 3);
        handle.gate(Gate::Release).unwrap();
        handle.gate(Gate::Release).unwrap();
        assert_eq!(handle.note_on(440.0), Err(ControlError::QueueFull));

        voice.render_block(&mut [0.0f32; 64]);
        assert_eq!(voice.frequency(), 0.0);
    }
}
