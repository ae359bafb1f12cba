//! Terminal front end: scope, spectrum, parameter panel and the piano keys.

mod controls;
mod spectrum;
mod status;
mod waveform;

use std::{io::stdout, time::Duration};

use color_eyre::eyre::Result as EyreResult;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, terminal,
};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;

use monosynth::{synth::voice::VoiceMeter, ControlError, EngineConfig, SynthHandle};

use crate::keyboard::{is_note_key, Keyboard, NoteEvent};
use controls::ParamPanel;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::{render_status, AudioStats, StatusLine};
use waveform::render_waveform;

/// Samples shown by the scope and fed to the FFT.
pub const VIS_BUFFER_SIZE: usize = 2048;

pub struct UiApp {
    handle: SynthHandle,
    keyboard: Keyboard,
    panel: ParamPanel,
    audio_rx: Consumer<f32>,
    meter_rx: Consumer<VoiceMeter>,
    meter: Option<VoiceMeter>,
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    config: EngineConfig,
    /// Terminal reports key releases (kitty keyboard protocol).
    release_events: bool,
    last_error: Option<ControlError>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        handle: SynthHandle,
        audio_rx: Consumer<f32>,
        meter_rx: Consumer<VoiceMeter>,
        config: EngineConfig,
        octave: i32,
    ) -> Self {
        Self {
            handle,
            keyboard: Keyboard::new(octave),
            panel: ParamPanel::new(),
            audio_rx,
            meter_rx,
            meter: None,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, config.sample_rate()),
            config,
            release_events: false,
            last_error: None,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        self.release_events = matches!(terminal::supports_keyboard_enhancement(), Ok(true));
        if self.release_events {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        tracing::info!(release_events = self.release_events, "terminal ready");

        let result = self.event_loop(terminal);

        if self.release_events {
            execute!(stdout(), PopKeyboardEnhancementFlags)?;
        }
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_meter();

            terminal.draw(|frame| self.render(frame))?;

            // ~60 fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }

        // Don't leave a note hanging while the stream winds down.
        let event = self.keyboard.release_all();
        self.send(event);
        Ok(())
    }

    fn poll_audio(&mut self) {
        let available = self.audio_rx.slots();
        if available == 0 {
            return;
        }

        self.audio_buffer.reserve(available);
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
        }
        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(..excess);
        }
        self.spectrum.update(&self.audio_buffer);
    }

    fn poll_meter(&mut self) {
        while let Ok(meter) = self.meter_rx.pop() {
            self.meter = Some(meter);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let code = match key.code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };

        if key.kind == KeyEventKind::Release {
            if let KeyCode::Char(c) = code {
                if let Some(event) = self.keyboard.release(c) {
                    self.send(event);
                }
            }
            return;
        }
        if key.kind == KeyEventKind::Repeat {
            return;
        }

        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char(' ') => {
                let event = self.keyboard.release_all();
                self.send(event);
            }
            KeyCode::Char('z') => self.keyboard.octave_down(),
            KeyCode::Char('x') => self.keyboard.octave_up(),
            KeyCode::Char(c) if is_note_key(c) => {
                // Without release events a new key replaces the old one.
                if !self.release_events {
                    self.keyboard.release_all();
                }
                if let Some(event) = self.keyboard.press(c) {
                    self.send(event);
                }
            }
            KeyCode::Up => self.panel.select_prev(),
            KeyCode::Down | KeyCode::Tab => self.panel.select_next(),
            KeyCode::Left | KeyCode::Char('-') => self.nudge(-1.0),
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => self.nudge(1.0),
            _ => {}
        }
    }

    fn nudge(&mut self, steps: f32) {
        let (id, value) = self.panel.nudge(steps);
        let result = self.handle.set_param_id(id, value);
        self.record(result);
    }

    fn send(&mut self, event: NoteEvent) {
        let result = match event {
            NoteEvent::On(hz) => self.handle.note_on(hz),
            NoteEvent::Retune(hz) => self.handle.set_frequency(hz),
            NoteEvent::Off => self.handle.note_off(),
        };
        self.record(result);
    }

    fn record(&mut self, result: Result<(), ControlError>) {
        match result {
            Ok(()) => self.last_error = None,
            Err(err) => {
                tracing::warn!(%err, "control update failed");
                self.last_error = Some(err);
            }
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status
                Constraint::Min(8),    // Scope + spectrum
                Constraint::Length(6), // Parameters
                Constraint::Length(1), // Help
            ])
            .split(frame.area());

        let status = StatusLine {
            sample_rate: self.config.sample_rate(),
            block_size: self.config.block_size(),
            octave: self.keyboard.octave(),
            held: self.keyboard.held(),
            meter: self.meter.as_ref(),
            error: self.last_error.as_ref(),
        };
        render_status(frame, chunks[0], &status, &AudioStats::from_buffer(&self.audio_buffer));

        let scopes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        render_waveform(frame, scopes[0], &self.audio_buffer);
        render_spectrum(
            frame,
            scopes[1],
            &self.spectrum,
            self.meter.map(|m| m.frequency_hz),
        );

        self.panel.render(frame, chunks[2]);

        let help = if self.release_events {
            " [a-l] Play  [z/x] Octave  [↑↓] Select  [←→] Adjust  [Space] Release  [Q] Quit"
        } else {
            " [a-l] Play  [Space] Release  [z/x] Octave  [↑↓] Select  [←→] Adjust  [Q] Quit"
        };
        frame.render_widget(
            Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
            chunks[3],
        );
    }
}
