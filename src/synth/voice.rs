use crate::{
    dsp::{
        envelope::{EnvelopeGenerator, EnvelopeStage},
        filter::BiquadLowPass,
        oscillator::Oscillator,
    },
    synth::{
        config::EngineConfig,
        message::{Gate, MessageReceiver, NoMessages, SynthMessage},
        params::{ParamId, ParamSet, MIN_CUTOFF_HZ},
    },
};

/// Cutoff sweep in Hz at full filter-envelope level and depth 1.0.
pub const FILTER_ENV_RANGE_HZ: f32 = 2_000.0;

/// Display snapshot of the voice, taken between blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceMeter {
    pub amp_stage: EnvelopeStage,
    pub amp_level: f32,
    pub filter_stage: EnvelopeStage,
    pub filter_level: f32,
    pub cutoff_hz: f32,
    pub frequency_hz: f32,
}

/// One monophonic voice: oscillator → amplitude envelope → low-pass.
///
/// Control messages are drained at the top of every `render_block`, so a
/// block sees every update that finished before it started and nothing that
/// lands while it runs. Envelopes are stepped once per block; the oscillator
/// and filter run per sample.
pub struct VoiceEngine<R: MessageReceiver = NoMessages> {
    config: EngineConfig,
    params: ParamSet,
    frequency: f32,
    oscillator: Oscillator,
    amp_envelope: EnvelopeGenerator,
    filter_envelope: EnvelopeGenerator,
    filter: BiquadLowPass,
    scratch: Vec<f32>,
    rx: R,
}

impl VoiceEngine<NoMessages> {
    /// A voice driven only through its direct setters.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_receiver(config, NoMessages)
    }
}

impl<R: MessageReceiver> VoiceEngine<R> {
    pub fn with_receiver(config: EngineConfig, rx: R) -> Self {
        let params = ParamSet::default();
        let sample_rate = config.sample_rate();

        Self {
            config,
            params,
            frequency: 0.0,
            oscillator: Oscillator::new(),
            amp_envelope: EnvelopeGenerator::new("amp", sample_rate),
            filter_envelope: EnvelopeGenerator::new("filter", sample_rate),
            filter: BiquadLowPass::new(
                sample_rate,
                params.filter.cutoff.min(config.max_cutoff()),
                params.filter.resonance,
            ),
            scratch: vec![0.0; config.block_size()],
            rx,
        }
    }

    pub fn apply(&mut self, msg: SynthMessage) {
        match msg {
            SynthMessage::Gate(gate) => self.set_gate(gate),
            SynthMessage::Frequency(hz) => self.set_frequency(hz),
            SynthMessage::Param { id, value } => {
                self.set_param(id, value);
            }
        }
    }

    /// Both envelopes see the same gate at the same time.
    pub fn set_gate(&mut self, gate: Gate) {
        tracing::trace!(?gate, "gate");
        self.amp_envelope.set_gate(gate);
        self.filter_envelope.set_gate(gate);
    }

    /// Retune the oscillator without touching either envelope. Negative or
    /// non-finite frequencies are ignored.
    pub fn set_frequency(&mut self, hz: f32) {
        if hz.is_finite() && hz >= 0.0 {
            self.frequency = hz;
        }
    }

    /// Store a parameter (clamped) and return the stored value.
    pub fn set_param(&mut self, id: ParamId, value: f32) -> f32 {
        let stored = self.params.set(id, value);
        if id == ParamId::FilterResonance {
            self.filter.set_resonance(stored);
        }
        stored
    }

    /// Render one mono block. Slices longer than the configured block size
    /// are rendered as consecutive blocks.
    pub fn render_block(&mut self, out: &mut [f32]) {
        while let Some(msg) = self.rx.pop() {
            self.apply(msg);
        }

        for block in out.chunks_mut(self.config.block_size()) {
            self.render_chunk(block);
        }
    }

    /// Fill an interleaved host buffer, writing the mono signal to every
    /// channel. Messages are picked up at each block boundary.
    pub fn render_interleaved(&mut self, data: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }

        let block_size = self.config.block_size();
        let mut scratch = std::mem::take(&mut self.scratch);

        for frames in data.chunks_mut(block_size * channels) {
            let frame_count = frames.len() / channels;
            let block = &mut scratch[..frame_count];
            self.render_block(block);

            for (frame, &sample) in frames.chunks_exact_mut(channels).zip(block.iter()) {
                frame.fill(sample);
            }
            frames[frame_count * channels..].fill(0.0);
        }

        self.scratch = scratch;
    }

    fn render_chunk(&mut self, out: &mut [f32]) {
        let len = out.len();
        let volume = self.amp_envelope.advance(&self.params.amp_envelope, len);
        let filter_level = self.filter_envelope.advance(&self.params.filter_envelope, len);

        let filter = &self.params.filter;
        let cutoff = filter.cutoff + filter.envelope * (filter_level * FILTER_ENV_RANGE_HZ);
        // Nyquist bound wins: at very low sample rates it sits under 1 Hz.
        self.filter
            .set_cutoff(cutoff.max(MIN_CUTOFF_HZ).min(self.config.max_cutoff()));

        let phase_increment =
            Oscillator::phase_increment(self.frequency, self.config.sample_rate());

        for sample in out.iter_mut() {
            let raw = self.oscillator.advance(phase_increment, &self.params.osc);
            let filtered = self.filter.advance(raw * volume);

            *sample = if filtered.is_finite() {
                filtered
            } else {
                self.filter.reset();
                0.0
            };
        }
    }

    pub fn meter(&self) -> VoiceMeter {
        VoiceMeter {
            amp_stage: self.amp_envelope.stage(),
            amp_level: self.amp_envelope.level(),
            filter_stage: self.filter_envelope.stage(),
            filter_level: self.filter_envelope.level(),
            cutoff_hz: self.filter.cutoff(),
            frequency_hz: self.frequency,
        }
    }

    /// True once the amplitude envelope has fully released.
    pub fn is_silent(&self) -> bool {
        self.amp_envelope.is_silent()
    }

    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
