use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::config::Region;
use crate::format;
use crate::surface::{Panel, PanelGrid, ValueKind};

use super::app::App;

pub(super) fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(32),
            Constraint::Percentage(36),
            Constraint::Percentage(32),
        ])
        .split(f.area());

    let top = halves(rows[0]);
    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(rows[1]);
    let bottom = halves(rows[2]);

    // A poisoned lock means a poll cycle died mid-apply; keep showing the
    // last rendered state.
    let grid = match app.grid.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    let now = Instant::now();

    render_region(f, top[0], &grid, Region::TopLeft, now);
    render_region(f, top[1], &grid, Region::TopRight, now);
    render_clock(f, middle[0], app);
    render_region(f, middle[1], &grid, Region::Center, now);
    render_slideshow(f, middle[2], app);
    render_region(f, bottom[0], &grid, Region::BottomLeft, now);
    render_region(f, bottom[1], &grid, Region::BottomRight, now);
}

fn halves(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
}

fn render_region(f: &mut Frame, area: Rect, grid: &PanelGrid, region: Region, now: Instant) {
    let panels: Vec<_> = grid.panels().filter(|(_, p)| p.region == region).collect();
    if panels.is_empty() {
        return;
    }

    let constraints: Vec<Constraint> = panels
        .iter()
        .map(|_| Constraint::Ratio(1, panels.len() as u32))
        .collect();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for ((_, panel), chunk) in panels.iter().zip(chunks.iter()) {
        render_panel(f, *chunk, panel, now);
    }
}

fn render_panel(f: &mut Frame, area: Rect, panel: &Panel, now: Instant) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            panel.title.clone(),
            Style::default().fg(Color::Yellow),
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = if panel.kind == "weather" {
        weather_lines(panel, now)
    } else {
        generic_lines(panel, now)
    };
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn weather_lines(panel: &Panel, now: Instant) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let temp = panel_text(panel, "temp").unwrap_or("--");
    let glyph = panel
        .targets()
        .iter()
        .find(|t| t.spec.path == "icon")
        .and_then(|t| t.attr("icon"))
        .map(icon_glyph)
        .unwrap_or("·");
    lines.push(Line::from(Span::styled(
        format!("{} {}", glyph, temp),
        target_style(panel, "temp", now).add_modifier(Modifier::BOLD),
    )));

    if let Some(condition) = panel_text(panel, "condition") {
        lines.push(Line::from(Span::styled(
            condition.to_string(),
            target_style(panel, "condition", now),
        )));
    }
    if let Some(city) = panel_text(panel, "city") {
        lines.push(Line::from(Span::styled(
            city.to_string(),
            Style::default().fg(Color::Gray),
        )));
    }
    lines
}

fn generic_lines(panel: &Panel, now: Instant) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for target in panel.targets() {
        let style = if target.is_flashing(now) {
            flash_style()
        } else {
            Style::default()
        };
        match &target.spec.kind {
            ValueKind::Markup => {
                if let Some(fragment) = target.markup() {
                    for text in format::to_lines(fragment) {
                        lines.push(Line::from(Span::styled(text, style)));
                    }
                }
            }
            ValueKind::Text => {
                if let Some(text) = target.text() {
                    lines.push(Line::from(Span::styled(text.to_string(), style)));
                }
            }
            // Attributes carry metadata (icons, sources); nothing generic to
            // print for them.
            ValueKind::Attribute(_) => {}
        }
    }
    lines
}

fn render_clock(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = vec![
        Line::from(Span::styled(
            app.clock.time_line(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            app.clock.date_line(),
            Style::default().fg(Color::Gray),
        )),
    ];
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

fn render_slideshow(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled("Photos", Style::default().fg(Color::Yellow)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = match app.slideshow.current() {
        Some((pos, total, path)) => vec![
            Line::from(path.to_string()),
            Line::from(Span::styled(
                format!("{} / {}", pos, total),
                Style::default().fg(Color::Gray),
            )),
        ],
        None => vec![Line::from(Span::styled(
            "No photos",
            Style::default().fg(Color::Gray),
        ))],
    };
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

fn panel_text<'a>(panel: &'a Panel, path: &str) -> Option<&'a str> {
    panel
        .targets()
        .iter()
        .find(|t| t.spec.path == path)
        .and_then(|t| t.text())
}

fn target_style(panel: &Panel, path: &str, now: Instant) -> Style {
    let flashing = panel
        .targets()
        .iter()
        .find(|t| t.spec.path == path)
        .is_some_and(|t| t.is_flashing(now));
    if flashing { flash_style() } else { Style::default() }
}

fn flash_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn icon_glyph(family: &str) -> &'static str {
    match family {
        "wi-sunny" => "☀",
        "wi-night" => "☽",
        "wi-partly-cloudy" => "⛅",
        "wi-cloudy" => "☁",
        "wi-rain" => "☂",
        "wi-thunderstorm" => "⚡",
        "wi-snow" => "❄",
        "wi-fog" => "≋",
        _ => "·",
    }
}
