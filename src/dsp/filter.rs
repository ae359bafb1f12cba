use std::f32::consts::TAU;

/*
Resonant Low-Pass Biquad
========================

A second-order IIR filter using the RBJ "Audio EQ Cookbook" low-pass
coefficients:

    ω  = 2π · cutoff / sample_rate
    α  = sin ω / (2 · resonance)

    b0 = (1 - cos ω) / 2      a0 = 1 + α
    b1 =  1 - cos ω           a1 = -2 cos ω
    b2 = (1 - cos ω) / 2      a2 = 1 - α

Difference equation (Direct Form I):

    a0·y[n] = b0·x[n] + b1·x[n-1] + b2·x[n-2] - a1·y[n-1] - a2·y[n-2]

Coefficients are cached and divided through by a0 once, when cutoff or
resonance changes, so the per-sample path is five multiplies and no trig.

Resonance is Q: 0.707 is the flat Butterworth response, larger values peak
at the cutoff. It must stay above zero (α divides by it), so the setter
floors it at MIN_RESONANCE. Cutoff is NOT clamped here; keeping it below
Nyquist is the caller's job.
*/

/// Smallest accepted resonance (Q).
pub const MIN_RESONANCE: f32 = 0.001;

/// Coefficients normalized by a0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl Coefficients {
    fn lowpass(cutoff_hz: f32, resonance: f32, sample_rate: f32) -> Self {
        let omega = TAU * cutoff_hz / sample_rate;
        let (sin_omega, cos_omega) = omega.sin_cos();
        let alpha = sin_omega / (2.0 * resonance);

        let b0 = (1.0 - cos_omega) / 2.0;
        let b1 = 1.0 - cos_omega;
        let b2 = b0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        let a0_inv = 1.0 / a0;
        Self {
            b0: b0 * a0_inv,
            b1: b1 * a0_inv,
            b2: b2 * a0_inv,
            a1: a1 * a0_inv,
            a2: a2 * a0_inv,
        }
    }
}

pub struct BiquadLowPass {
    sample_rate: f32,
    cutoff_hz: f32,
    resonance: f32,
    coefficients: Coefficients,

    // Input history x[n-1], x[n-2]
    x1: f32,
    x2: f32,
    // Output history y[n-1], y[n-2]
    y1: f32,
    y2: f32,
}

impl BiquadLowPass {
    pub fn new(sample_rate: f32, cutoff_hz: f32, resonance: f32) -> Self {
        let resonance = resonance.max(MIN_RESONANCE);
        Self {
            sample_rate,
            cutoff_hz,
            resonance,
            coefficients: Coefficients::lowpass(cutoff_hz, resonance, sample_rate),
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Set the cutoff in Hz and recompute coefficients.
    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        if cutoff_hz == self.cutoff_hz {
            return;
        }
        self.cutoff_hz = cutoff_hz;
        self.recalculate();
    }

    /// Set the resonance (Q) and recompute coefficients.
    pub fn set_resonance(&mut self, resonance: f32) {
        let resonance = resonance.max(MIN_RESONANCE);
        if resonance == self.resonance {
            return;
        }
        self.resonance = resonance;
        self.recalculate();
    }

    /// Filter one sample.
    #[inline]
    pub fn advance(&mut self, input: f32) -> f32 {
        let c = &self.coefficients;
        let output =
            c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Filter a buffer in place.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.advance(*sample);
        }
    }

    /// Clear the sample history, keeping the coefficients.
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    pub fn coefficients(&self) -> Coefficients {
        self.coefficients
    }

    fn recalculate(&mut self) {
        self.coefficients = Coefficients::lowpass(self.cutoff_hz, self.resonance, self.sample_rate);
    }
}
