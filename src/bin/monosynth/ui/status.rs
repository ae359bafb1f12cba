//! Status bar: device, keyboard and voice state, output level.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use monosynth::{dsp::EnvelopeStage, synth::voice::VoiceMeter, ControlError};

pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub struct StatusLine<'a> {
    pub sample_rate: f32,
    pub block_size: usize,
    pub octave: i32,
    pub held: &'a [char],
    pub meter: Option<&'a VoiceMeter>,
    pub error: Option<&'a ControlError>,
}

fn stage_name(stage: EnvelopeStage) -> &'static str {
    match stage {
        EnvelopeStage::Attack => "attack",
        EnvelopeStage::Decay => "decay",
        EnvelopeStage::Sustain => "sustain",
        EnvelopeStage::Release => "release",
    }
}

pub fn render_status(frame: &mut Frame, area: Rect, status: &StatusLine, stats: &AudioStats) {
    let block = Block::default()
        .title(" monosynth ")
        .borders(Borders::ALL);

    let held: String = status.held.iter().collect();
    let mut spans = vec![
        Span::styled(
            format!(" {:.1}kHz/{}  ", status.sample_rate / 1000.0, status.block_size),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Oct {}  ", status.octave),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(format!("[{held}]  "), Style::default().fg(Color::White)),
    ];

    if let Some(meter) = status.meter {
        let gate_color = match meter.amp_stage {
            EnvelopeStage::Release => Color::Yellow,
            _ => Color::Green,
        };
        spans.push(Span::styled(
            format!("{:.1} Hz  ", meter.frequency_hz),
            Style::default().fg(Color::White),
        ));
        spans.push(Span::styled(
            format!("amp {} {:.2}  ", stage_name(meter.amp_stage), meter.amp_level),
            Style::default().fg(gate_color),
        ));
        spans.push(Span::styled(
            format!("cutoff {:.0} Hz  ", meter.cutoff_hz),
            Style::default().fg(Color::Blue),
        ));
    }

    spans.push(Span::styled(
        format!("Peak: {:.2}  RMS: {:.2}", stats.peak, stats.rms),
        Style::default().fg(Color::Magenta),
    ));

    if let Some(err) = status.error {
        spans.push(Span::styled(format!("  {err}"), Style::default().fg(Color::Red)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
