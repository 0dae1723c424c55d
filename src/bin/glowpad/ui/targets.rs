//! Targets widget - one row per pad with its live colours

use glowpad::TargetPhase;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{
    params::swatch,
    state::{SceneSnapshot, UiStateInit},
};

/// Render one row per target: label, phase, then a block per renderable
pub fn render_targets(
    frame: &mut Frame,
    area: Rect,
    init: &UiStateInit,
    snapshot: &SceneSnapshot,
    held: &[bool],
) {
    if area.height < 1 || area.width < 20 {
        return;
    }

    let mut lines = Vec::new();

    for (index, (info, view)) in init.targets.iter().zip(snapshot.targets()).enumerate() {
        let mut spans = Vec::new();
        let is_held = held.get(index).copied().unwrap_or(false);

        // Target name (padded)
        spans.push(Span::styled(
            format!("{:8}", info.name),
            Style::default().fg(if is_held { Color::White } else { Color::DarkGray }),
        ));

        let (phase, phase_color) = match view.phase {
            TargetPhase::Idle => ("idle ", Color::DarkGray),
            TargetPhase::ConvergingOn => ("on   ", Color::Green),
            TargetPhase::ConvergingOff => ("off  ", Color::Yellow),
            TargetPhase::Draining => ("drain", Color::Magenta),
        };
        spans.push(Span::styled(format!("{phase} "), Style::default().fg(phase_color)));
        spans.push(Span::styled(
            if view.pending_release { "⏸ " } else { "  " },
            Style::default().fg(Color::Yellow),
        ));

        // One block per renderable
        let width = if info.is_array { "██" } else { "████████" };
        for color in &view.colors[..view.num_children as usize] {
            spans.push(Span::styled(width, Style::default().fg(swatch(*color))));
        }

        if info.is_array && view.phase != TargetPhase::Idle {
            spans.push(Span::styled(
                format!("  it {}", view.iteration),
                Style::default().fg(Color::DarkGray),
            ));
        }

        lines.push(Line::from(spans));
    }

    if let Some(threshold) = init.pad_cc_threshold {
        let nudges = init.pad_count.saturating_sub(threshold as usize);
        lines.push(Line::from(Span::styled(
            format!("pads {threshold}.. ({nudges}) nudge parameters"),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, area);
}
