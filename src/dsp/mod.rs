//! Low-level DSP primitives used by the voice engine.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside the voice struct. They stay focused on the
//! signal-processing math; parameter plumbing and block scheduling live in
//! `synth`.

/// Attack/decay/sustain/release envelope generator with millisecond timing.
pub mod envelope;
/// Cookbook resonant low-pass biquad.
pub mod filter;
/// Phase-accumulator oscillator with sine/saw blend, clip and fold.
pub mod oscillator;

pub use envelope::{EnvelopeGenerator, EnvelopeStage};
pub use filter::BiquadLowPass;
pub use oscillator::Oscillator;
