//! Spectrum analyzer: Hann-windowed FFT read out at log-spaced frequencies
//! and drawn on a log frequency axis.

use std::sync::Arc;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

const SPECTRUM_POINTS: usize = 96;
const MIN_FREQ_HZ: f32 = 20.0;
const MAX_FREQ_HZ: f32 = 20_000.0;
const FLOOR_DB: f64 = -100.0;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// FFT bin read for each display point.
    bin_indices: Vec<usize>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (log10 Hz, dB) pairs ready for the chart.
    points: Vec<(f64, f64)>,
    max_log_freq: f64,
}

impl SpectrumAnalyzer {
    pub fn new(fft_len: usize, sample_rate: f32) -> Self {
        let fft = FftPlanner::<f32>::new().plan_fft_forward(fft_len);

        let denom = fft_len.saturating_sub(1).max(1) as f32;
        let window = (0..fft_len)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos()))
            .collect();

        let max_freq = (sample_rate / 2.0).min(MAX_FREQ_HZ).max(MIN_FREQ_HZ);
        let ratio = max_freq / MIN_FREQ_HZ;
        let last_bin = (fft_len / 2).saturating_sub(1);

        let mut bin_indices = Vec::with_capacity(SPECTRUM_POINTS);
        let mut points = Vec::with_capacity(SPECTRUM_POINTS);
        for i in 0..SPECTRUM_POINTS {
            let t = i as f32 / (SPECTRUM_POINTS - 1) as f32;
            let freq = MIN_FREQ_HZ * ratio.powf(t);
            let index = (freq * fft_len as f32 / sample_rate).round() as usize;
            bin_indices.push(index.min(last_bin));
            points.push((f64::from(freq).log10(), FLOOR_DB));
        }

        Self {
            window,
            bin_indices,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_len],
            points,
            max_log_freq: f64::from(max_freq).log10(),
        }
    }

    /// Recompute from the latest samples. Buffers of the wrong length are
    /// skipped.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((bin, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *bin = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        // Scale so a full-scale sine reads close to 0 dB.
        let norm = 2.0 / self.window.iter().sum::<f32>().max(f32::EPSILON);
        for (point, &index) in self.points.iter_mut().zip(&self.bin_indices) {
            let magnitude = self.scratch[index].norm() * norm;
            point.1 = (20.0 * f64::from(magnitude.max(1e-6)).log10()).max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn max_log_freq(&self) -> f64 {
        self.max_log_freq
    }
}

/// Draw the spectrum, with a marker line at the voice's pitch when one is
/// sounding.
pub fn render_spectrum(
    frame: &mut Frame,
    area: Rect,
    analyzer: &SpectrumAnalyzer,
    fundamental_hz: Option<f32>,
) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);
    let min_log = f64::from(MIN_FREQ_HZ).log10();

    let marker: Vec<(f64, f64)> = fundamental_hz
        .filter(|&hz| hz >= MIN_FREQ_HZ)
        .map(|hz| {
            let x = f64::from(hz).log10();
            vec![(x, FLOOR_DB), (x, 0.0)]
        })
        .unwrap_or_default();

    let datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::DarkGray))
            .data(&marker),
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(analyzer.data()),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([min_log, analyzer.max_log_freq()])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 0.0])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_peaks_near_its_frequency() {
        let sample_rate = 48_000.0;
        let len = 2048;
        let mut analyzer = SpectrumAnalyzer::new(len, sample_rate);

        let freq = 1_000.0;
        let buffer: Vec<f32> = (0..len)
            .map(|i| (std::f32::consts::TAU * freq * i as f32 / sample_rate).sin())
            .collect();
        analyzer.update(&buffer);

        let (peak_log, peak_db) = analyzer
            .data()
            .iter()
            .copied()
            .fold((0.0, f64::MIN), |best, p| if p.1 > best.1 { p } else { best });
        let peak_hz = 10f64.powf(peak_log);
        assert!((peak_hz / 1_000.0 - 1.0).abs() < 0.1, "peak at {peak_hz} Hz");
        assert!(peak_db > -6.0, "peak level {peak_db} dB");
    }

    #[test]
    fn wrong_length_is_ignored() {
        let mut analyzer = SpectrumAnalyzer::new(1024, 48_000.0);
        analyzer.update(&[1.0; 10]);
        assert!(analyzer.data().iter().all(|&(_, db)| db == FLOOR_DB));
    }
}
