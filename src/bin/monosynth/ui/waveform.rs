//! Oscilloscope with a rising zero-crossing trigger.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Index of the first rising zero crossing in the first half of `buffer`,
/// so a steady tone is drawn from the same phase every frame.
fn trigger_point(buffer: &[f32]) -> usize {
    let search = buffer.len() / 2;
    buffer[..search.max(1).min(buffer.len())]
        .windows(2)
        .position(|w| w[0] <= 0.0 && w[1] > 0.0)
        .map_or(0, |i| i + 1)
}

pub fn render_waveform(frame: &mut Frame, area: Rect, audio_buffer: &[f32]) {
    let block = Block::default().title(" Scope ").borders(Borders::ALL);

    let start = trigger_point(audio_buffer);
    let window = &audio_buffer[start..(start + audio_buffer.len() / 2).min(audio_buffer.len())];
    let width = window.len().max(1) as f64;

    let data: Vec<(f64, f64)> = window
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64 / width, sample as f64))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .labels(vec!["-1", "0", "1"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_finds_rising_crossing() {
        let buffer = [0.5, 0.2, -0.3, -0.1, 0.4, 0.8, 0.1, -0.2];
        assert_eq!(trigger_point(&buffer), 4);
    }

    #[test]
    fn trigger_falls_back_to_start() {
        assert_eq!(trigger_point(&[0.0; 16]), 0);
        assert_eq!(trigger_point(&[]), 0);
    }
}
