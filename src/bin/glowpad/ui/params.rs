//! Parameter panel - colour swatch, envelope times, knob row and engine status

use glowpad::{
    controller::control_map::Parameter, io::midi::CC_MAX, EnvelopeParameters, Rgba,
    SequencingMode,
};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::state::{SceneSnapshot, UiStateInit};

/// Last CC value sent for every parameter, plus the knob under the cursor
pub struct KnobState {
    selected: usize,
    values: [u8; Parameter::ALL.len()],
}

impl KnobState {
    pub fn selected(&self) -> Parameter {
        Parameter::ALL[self.selected]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % Parameter::ALL.len();
    }

    pub fn select_previous(&mut self) {
        self.selected = (self.selected + Parameter::ALL.len() - 1) % Parameter::ALL.len();
    }

    /// Move the selected knob and return its new CC value
    pub fn turn(&mut self, delta: i16) -> u8 {
        let value = &mut self.values[self.selected];
        *value = (*value as i16 + delta).clamp(0, CC_MAX as i16) as u8;
        *value
    }
}

/// Knob positions matching the configured starting parameters
pub fn initial_knobs(init: &UiStateInit) -> KnobState {
    let p = &init.params;
    let scale = |value: f32, max: f32| -> u8 {
        if max <= 0.0 {
            return 0;
        }
        ((value / max).clamp(0.0, 1.0) * CC_MAX).round() as u8
    };

    let mut values = [0u8; Parameter::ALL.len()];
    for (value, parameter) in values.iter_mut().zip(Parameter::ALL) {
        *value = match parameter {
            Parameter::Red => scale(p.color.r, 1.0),
            Parameter::Green => scale(p.color.g, 1.0),
            Parameter::Blue => scale(p.color.b, 1.0),
            Parameter::Alpha => scale(p.color.a, 1.0),
            Parameter::HueShift => 0,
            Parameter::Attack => scale(p.attack, init.max_time),
            Parameter::Decay => scale(p.decay, init.max_time),
            Parameter::Sustain => scale(p.sustain, init.max_time),
            Parameter::Release => scale(p.release, init.max_time),
            Parameter::Intensity => scale(p.intensity_multiplier, init.max_intensity),
            Parameter::ArrayOffset => p.starting_array_index_offset.clamp(0, 127) as u8,
            Parameter::Sequencing => match p.sequencing {
                SequencingMode::Simultaneous => 0,
                SequencingMode::Ripple => 64,
                SequencingMode::ReverseRipple => 127,
            },
            Parameter::BehaviorIndex => {
                if p.use_behavior_index {
                    127
                } else {
                    0
                }
            }
        };
    }

    KnobState {
        selected: 0,
        values,
    }
}

/// Terminal colour for a renderable, dimmed by its alpha
pub fn swatch(color: Rgba) -> Color {
    let (r, g, b) = (color * color.a).to_rgb8();
    Color::Rgb(r, g, b)
}

fn sequencing_name(mode: SequencingMode) -> &'static str {
    match mode {
        SequencingMode::Simultaneous => "simultaneous",
        SequencingMode::Ripple => "ripple",
        SequencingMode::ReverseRipple => "reverse ripple",
    }
}

/// Render the parameter panel
pub fn render_params(
    frame: &mut Frame,
    area: Rect,
    params: &EnvelopeParameters,
    knobs: &KnobState,
    snapshot: &SceneSnapshot,
    last_pad: Option<usize>,
) {
    let block = Block::default().title(" glowpad ").borders(Borders::ALL);
    let c = params.color;

    let color_line = Line::from(vec![
        Span::styled(" ████ ", Style::default().fg(swatch(c))),
        Span::styled(
            format!("rgba {:.2} {:.2} {:.2} {:.2}  ", c.r, c.g, c.b, c.a),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!(
                "A {:.2}s  D {:.2}s  S {:.2}s  R {:.2}s  ",
                params.attack, params.decay, params.sustain, params.release
            ),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("intensity 2^{:.1}", params.intensity_multiplier),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let array_line = Line::from(vec![
        Span::styled(
            format!(" {}  ", sequencing_name(params.sequencing)),
            Style::default().fg(Color::Green),
        ),
        Span::styled(
            format!(
                "offset {}  behavior index {}  ",
                params.starting_array_index_offset,
                if params.use_behavior_index { "on" } else { "off" }
            ),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{:.0} Hz", params.update_rate_hz),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let mut knob_spans = vec![Span::raw(" ")];
    for (i, parameter) in Parameter::ALL.into_iter().enumerate() {
        let style = if i == knobs.selected {
            Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        knob_spans.push(Span::styled(
            format!("{} {}", parameter.name(), knobs.values[i]),
            style,
        ));
        knob_spans.push(Span::raw(" "));
    }

    let last_pad = last_pad.map_or_else(|| "-".to_string(), |pad| pad.to_string());
    let status_line = Line::from(Span::styled(
        format!(
            " t {:.1}s  steps {}  last pad {}",
            snapshot.time, snapshot.steps, last_pad
        ),
        Style::default().fg(Color::DarkGray),
    ));

    let paragraph = Paragraph::new(vec![color_line, array_line, Line::from(knob_spans), status_line])
        .block(block);
    frame.render_widget(paragraph, area);
}
