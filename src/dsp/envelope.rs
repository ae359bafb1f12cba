use crate::{synth::message::Gate, MS_PER_SECOND};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Block-Rate ADSR Envelope
========================

This envelope is evaluated once per audio block, not once per sample. Each
call to `advance` returns the level for the START of the block and then moves
the clock forward by the block's duration in milliseconds. The voice engine
holds that level for the whole block.

Vocabulary
----------

  stage       Attack, Decay, Sustain or Release.

  elapsed     Milliseconds spent in the current stage. Reset to 0 on every
              gate event and on every stage change.

  release     The level to fall from when the gate closes. Tracked
  volume      continuously outside Release, so releasing mid-attack falls
              from wherever the attack had reached instead of jumping to the
              sustain level.


The Shape
---------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release

  Attack    level = elapsed / attack                        (0 → 1)
  Decay     level = S + (decay - elapsed) / decay · (1 - S)  (1 → S)
  Sustain   level = S, no exit until the gate closes
  Release   level = max(0, R - elapsed / release · R)        (R → 0)


Attack ceiling
--------------

Because the clock moves a whole block at a time, the last Attack block can
land past `attack` ms, where `elapsed / attack` exceeds 1. The level is
capped at 1.0 there, so the envelope never leaves 0..1. An uncapped ramp
would overshoot for that one block before Decay takes over.


Zero-length stages
------------------

A zero attack skips straight into Decay within the same call, a zero decay
lands on Sustain, and a zero release drops to 0 at once. None of them divide
by zero.


Parameters are live
-------------------

The generator does not own its attack/decay/sustain/release values. They are
passed in on every call, so a knob turned mid-note reshapes the stage that is
currently running.

There is no separate Idle stage: a finished Release sits at 0 until the next
Attack gate.
*/

/// Timing and level controls for one envelope. Times are in milliseconds.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack: 20.0,
            decay: 20.0,
            sustain: 0.5,
            release: 20.0,
        }
    }
}

/// Stage of the envelope state machine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Attack,
    Decay,
    Sustain,
    Release,
}

pub struct EnvelopeGenerator {
    name: &'static str,
    ms_per_sample: f32,
    stage: EnvelopeStage,
    elapsed_ms: f32,
    release_volume: f32,
    level: f32,
}

impl EnvelopeGenerator {
    /// A silent envelope resting in Release. `name` labels trace output.
    pub fn new(name: &'static str, sample_rate: f32) -> Self {
        Self {
            name,
            ms_per_sample: MS_PER_SECOND / sample_rate,
            stage: EnvelopeStage::Release,
            elapsed_ms: 0.0,
            release_volume: 0.0,
            level: 0.0,
        }
    }

    /// Attack and Release are legal from any stage. Either way the stage
    /// clock restarts; the remembered release volume is left untouched.
    pub fn set_gate(&mut self, gate: Gate) {
        let stage = match gate {
            Gate::Attack => EnvelopeStage::Attack,
            Gate::Release => EnvelopeStage::Release,
        };
        self.enter(stage);
    }

    /// Level for the start of a `block_samples` block, then advance the clock
    /// by that block's duration.
    pub fn advance(&mut self, params: &EnvelopeParams, block_samples: usize) -> f32 {
        if self.stage == EnvelopeStage::Attack && params.attack <= 0.0 {
            self.transition(EnvelopeStage::Decay);
        }

        let volume = match self.stage {
            EnvelopeStage::Attack => {
                let volume = (self.elapsed_ms / params.attack).min(1.0);
                self.release_volume = volume;
                if self.elapsed_ms >= params.attack {
                    self.enter(EnvelopeStage::Decay);
                }
                volume
            }
            EnvelopeStage::Decay => {
                if params.decay <= 0.0 {
                    self.enter(EnvelopeStage::Sustain);
                    self.release_volume = params.sustain;
                    params.sustain
                } else {
                    let remaining = ((params.decay - self.elapsed_ms) / params.decay).max(0.0);
                    let volume = params.sustain + remaining * (1.0 - params.sustain);
                    self.release_volume = volume;
                    if self.elapsed_ms > params.decay {
                        self.enter(EnvelopeStage::Sustain);
                    }
                    volume
                }
            }
            EnvelopeStage::Sustain => {
                self.release_volume = params.sustain;
                self.elapsed_ms = 0.0;
                params.sustain
            }
            EnvelopeStage::Release => {
                if params.release <= 0.0 {
                    0.0
                } else {
                    let fallen = self.elapsed_ms / params.release * self.release_volume;
                    (self.release_volume - fallen).max(0.0)
                }
            }
        };

        self.elapsed_ms += self.ms_per_sample * block_samples as f32;
        self.level = volume;
        volume
    }

    /// True once Release has reached 0.
    pub fn is_silent(&self) -> bool {
        self.stage == EnvelopeStage::Release && self.level <= 0.0
    }

    /// Most recent level returned by `advance`.
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    pub fn release_volume(&self) -> f32 {
        self.release_volume
    }

    /// Back to silent Release, forgetting the release volume.
    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Release;
        self.elapsed_ms = 0.0;
        self.release_volume = 0.0;
        self.level = 0.0;
    }

    // Stage change without touching the clock (zero-length attack falls
    // through into Decay inside the same call).
    fn transition(&mut self, stage: EnvelopeStage) {
        tracing::trace!(envelope = self.name, ?stage, "envelope stage");
        self.stage = stage;
    }

    fn enter(&mut self, stage: EnvelopeStage) {
        self.transition(stage);
        self.elapsed_ms = 0.0;
    }
}
