use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{App, ChipView, Focus};

/// Color palette, Catppuccin Mocha inspired defaults.
mod colors {
    use ratatui::style::Color;

    pub const BASE: Color = Color::Rgb(30, 30, 46);
    pub const SURFACE0: Color = Color::Rgb(49, 50, 68);
    pub const TEXT: Color = Color::Rgb(205, 214, 244);
    pub const SUBTEXT0: Color = Color::Rgb(166, 173, 200);
    pub const LAVENDER: Color = Color::Rgb(180, 190, 254);
    pub const BLUE: Color = Color::Rgb(137, 180, 250);
    pub const GREEN: Color = Color::Rgb(166, 227, 161);
    pub const YELLOW: Color = Color::Rgb(249, 226, 175);
    pub const RED: Color = Color::Rgb(243, 139, 168);
}

/// Render the whole picker.
pub fn render(frame: &mut Frame, app: &App) {
    let size = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(3),    // chips + input
            Constraint::Length(dropdown_height(app)),
            Constraint::Length(1), // status bar
        ])
        .split(size);

    render_header(frame, app, layout[0]);
    render_field(frame, app, layout[1]);
    render_dropdown(frame, app, layout[2]);
    render_status_bar(frame, app, layout[3]);
}

fn dropdown_height(app: &App) -> u16 {
    if app.dropdown.active {
        u16::try_from(app.dropdown.items.len())
            .unwrap_or(u16::MAX)
            .saturating_add(2)
    } else {
        0
    }
}

// ─── Header ────────────────────────────────────────────────

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let header = Line::from(vec![
        Span::styled(
            format!(" {} ", app.ui.title),
            Style::default().fg(colors::LAVENDER).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {} selected", app.chip_views().len()),
            Style::default().fg(colors::SUBTEXT0),
        ),
    ]);

    frame.render_widget(
        Paragraph::new(header).style(Style::default().bg(colors::SURFACE0)),
        area,
    );
}

// ─── Chips + input ─────────────────────────────────────────

fn chip_spans(chip: &ChipView) -> Vec<Span<'static>> {
    let style = if chip.focused {
        Style::default().fg(colors::BASE).bg(colors::RED).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors::BLUE).bg(colors::SURFACE0)
    };
    vec![
        Span::styled(format!(" {} ×", chip.label), style),
        Span::raw(" "),
    ]
}

fn render_field(frame: &mut Frame, app: &App, area: Rect) {
    let focused_input = app.focus == Focus::Input;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused_input { colors::GREEN } else { colors::BLUE }))
        .style(Style::default().bg(colors::BASE));

    let mut spans: Vec<Span> = app.chip_views().iter().flat_map(chip_spans).collect();

    let query = app.query();
    let cursor = app.cursor.min(query.len());
    let (before, after) = query.split_at(cursor);
    spans.push(Span::styled(before.to_string(), Style::default().fg(colors::TEXT)));
    if focused_input {
        spans.push(Span::styled("█", Style::default().fg(colors::TEXT)));
    }
    spans.push(Span::styled(after.to_string(), Style::default().fg(colors::TEXT)));

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

// ─── Dropdown ──────────────────────────────────────────────

fn render_dropdown(frame: &mut Frame, app: &App, area: Rect) {
    if !app.dropdown.active || area.height == 0 {
        return;
    }

    let items: Vec<ListItem> = app
        .dropdown
        .items
        .iter()
        .enumerate()
        .map(|(i, hit)| {
            let selected = app.dropdown.selected == Some(i);
            let base = if selected {
                Style::default().fg(colors::BASE).bg(colors::BLUE)
            } else {
                Style::default().fg(colors::TEXT)
            };
            let spans: Vec<Span> = hit
                .formatted
                .chars()
                .enumerate()
                .map(|(ci, c)| {
                    if hit.match_indices.contains(&(ci as u32)) {
                        Span::styled(
                            c.to_string(),
                            base.fg(if selected { colors::BASE } else { colors::YELLOW })
                                .add_modifier(Modifier::BOLD),
                        )
                    } else {
                        Span::styled(c.to_string(), base)
                    }
                })
                .collect();
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors::SUBTEXT0))
            .style(Style::default().bg(colors::BASE)),
    );
    frame.render_widget(list, area);
}

// ─── Status bar ────────────────────────────────────────────

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let help = match app.focus {
        Focus::Input => "Enter: add/submit  ↑↓: select  Bksp(empty): chips  C-l: clear  Esc: cancel",
        Focus::Chip(_) => "←→: move  x/Del: remove  Esc: back to input  Enter: submit",
    };

    let mut spans = vec![Span::styled(
        format!(" {} ", app.status_message),
        Style::default().fg(colors::TEXT),
    )];
    if app.ui.show_help {
        spans.push(Span::styled(
            help,
            Style::default().fg(colors::SUBTEXT0).add_modifier(Modifier::DIM),
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(colors::SURFACE0)),
        area,
    );
}
