//! Parameter panel: one column per group, arrow keys select and nudge.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use monosynth::{
    synth::params::{ParamGroup, ParamInfo},
    ParamId, ParamSet,
};

/// Full knob travel in key presses.
const KNOB_STEPS: f32 = 50.0;
const BAR_WIDTH: usize = 8;

/// The UI's copy of the parameters. It starts from the same defaults as the
/// voice and every change is sent on, so the two stay in step.
pub struct ParamPanel {
    values: ParamSet,
    selected: usize,
}

impl ParamPanel {
    pub fn new() -> Self {
        Self {
            values: ParamSet::default(),
            selected: 0,
        }
    }

    pub fn selected(&self) -> ParamId {
        ParamId::ALL[self.selected]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % ParamId::ALL.len();
    }

    pub fn select_prev(&mut self) {
        self.selected = (self.selected + ParamId::ALL.len() - 1) % ParamId::ALL.len();
    }

    /// Move the selected parameter by `steps` knob steps, staying inside its
    /// UI range. Returns the parameter and the value to send.
    pub fn nudge(&mut self, steps: f32) -> (ParamId, f32) {
        let id = self.selected();
        let ParamInfo { ui_min, ui_max, .. } = id.info();
        let step = (ui_max - ui_min) / KNOB_STEPS;

        let target = (self.values.get(id) + step * steps).clamp(ui_min, ui_max);
        (id, self.values.set(id, target))
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);

        for (group, column) in ParamGroup::ALL.into_iter().zip(columns.iter()) {
            let lines: Vec<Line> = ParamId::ALL
                .into_iter()
                .filter(|id| id.group() == group)
                .map(|id| self.row(id))
                .collect();

            let block = Block::default()
                .title(format!(" {} ", group.label()))
                .borders(Borders::ALL);
            frame.render_widget(Paragraph::new(lines).block(block), *column);
        }
    }

    fn row(&self, id: ParamId) -> Line<'static> {
        let info = id.info();
        let value = self.values.get(id);

        let style = if id == self.selected() {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::styled(format!("{:<10}", info.label), style),
            Span::styled(bar(value, &info), Style::default().fg(Color::Cyan)),
            Span::styled(format!(" {}", format_value(value, &info)), style),
        ])
    }
}

fn bar(value: f32, info: &ParamInfo) -> String {
    let span = (info.ui_max - info.ui_min).max(f32::EPSILON);
    let fraction = ((value - info.ui_min) / span).clamp(0.0, 1.0);
    let filled = (fraction * BAR_WIDTH as f32).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn format_value(value: f32, info: &ParamInfo) -> String {
    match info.unit {
        Some(unit) => format!("{value:.0} {unit}"),
        None => format!("{value:.2}"),
    }
}
