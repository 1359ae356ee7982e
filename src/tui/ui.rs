//! Board rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::app::{App, NoticeKind};
use super::hooks::Hook;
use crate::models::{truncate, Bucket, Issue, Theme};

const CARD_HEIGHT: u16 = 4;
const LINK_MARKER: &str = "↗";

struct Palette {
    fg: Color,
    bg: Color,
    lane_bg: Color,
    accent: Color,
    muted: Color,
    error: Color,
    ok: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            fg: Color::Black,
            bg: Color::White,
            lane_bg: Color::Gray,
            accent: Color::Blue,
            muted: Color::DarkGray,
            error: Color::Red,
            ok: Color::Green,
        },
        Theme::Dark => Palette {
            fg: Color::White,
            bg: Color::Black,
            lane_bg: Color::Reset,
            accent: Color::LightCyan,
            muted: Color::Gray,
            error: Color::LightRed,
            ok: Color::LightGreen,
        },
    }
}

/// Draw the whole board and record every interactive region in `app.hits`.
pub fn render(frame: &mut Frame, app: &mut App) {
    app.hits.clear();
    let pal = palette(app.theme);
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().fg(pal.fg).bg(pal.bg)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(3), // url input
            Constraint::Length(1), // buttons
            Constraint::Length(1), // status
            Constraint::Min(CARD_HEIGHT + 2),
            Constraint::Length(1), // help
        ])
        .split(area);

    render_header(frame, app, &pal, &chunks[..4]);
    render_lanes(frame, app, &pal, chunks[4]);
    render_help(frame, app, &pal, chunks[5]);
    render_preview(frame, app, &pal, chunks[4]);
}

fn render_header(frame: &mut Frame, app: &mut App, pal: &Palette, chunks: &[Rect]) {
    let title = Paragraph::new(Line::from(Span::styled(
        "GitHub Kanban Board",
        Style::default().fg(pal.accent).add_modifier(Modifier::BOLD),
    )))
    .alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let input_style = if app.editing {
        Style::default().fg(pal.accent)
    } else {
        Style::default().fg(pal.muted)
    };
    let input_text = if app.input.is_empty() && !app.editing {
        Span::styled(
            "Enter GitHub repo URL (e.g. https://github.com/facebook/react)",
            Style::default().fg(pal.muted),
        )
    } else if app.editing {
        Span::raw(format!("{}_", app.input))
    } else {
        Span::raw(app.input.clone())
    };
    let input = Paragraph::new(Line::from(input_text)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(input_style)
            .title(" Repository "),
    );
    frame.render_widget(input, chunks[1]);
    app.hits.register(Hook::RepoUrlInput, chunks[1]);

    let buttons = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    let load_label = if app.loading {
        "[ Loading... ]"
    } else {
        "[ Load Issues ]"
    };
    let load_style = if app.loading {
        Style::default().fg(pal.muted)
    } else {
        Style::default().fg(pal.ok).add_modifier(Modifier::BOLD)
    };
    frame.render_widget(
        Paragraph::new(Span::styled(load_label, load_style))
            .alignment(ratatui::layout::Alignment::Center),
        buttons[0],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            "[ Reset Board ]",
            Style::default().fg(pal.error).add_modifier(Modifier::BOLD),
        ))
        .alignment(ratatui::layout::Alignment::Center),
        buttons[1],
    );
    // Disabled while a fetch is outstanding.
    if !app.loading {
        app.hits.register(Hook::LoadButton, buttons[0]);
    }
    app.hits.register(Hook::ResetButton, buttons[1]);

    frame.render_widget(Paragraph::new(status_line(app, pal)), chunks[3]);
}

fn status_line(app: &App, pal: &Palette) -> Line<'static> {
    if let Some(notice) = &app.notice {
        let color = match notice.kind {
            NoticeKind::Info => pal.ok,
            NoticeKind::Error => pal.error,
        };
        return Line::from(Span::styled(notice.text.clone(), Style::default().fg(color)));
    }
    match &app.repo_info {
        Some(info) => Line::from(vec![
            Span::styled(info.full_name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" by {}", info.owner.login)),
            Span::styled(
                format!("  ★ {}", info.stargazers_count),
                Style::default().fg(pal.accent),
            ),
        ]),
        None => Line::from(""),
    }
}

fn render_lanes(frame: &mut Frame, app: &mut App, pal: &Palette, area: Rect) {
    if app.is_narrow() {
        let bucket = app.cursor.bucket;
        render_lane(frame, app, pal, bucket, area, true);
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);
    for (bucket, rect) in Bucket::ALL.into_iter().zip(columns.iter()) {
        render_lane(frame, app, pal, bucket, *rect, false);
    }
}

fn render_lane(frame: &mut Frame, app: &mut App, pal: &Palette, bucket: Bucket, area: Rect, single: bool) {
    let count = app.board.lane(bucket).len();
    let title = if single {
        format!(" ◀ {} ({}) ▶ ", bucket.title(), count)
    } else {
        format!(" {} ({}) ", bucket.title(), count)
    };
    let focused = app.cursor.bucket == bucket;
    let border = if focused {
        Style::default().fg(pal.accent)
    } else {
        Style::default().fg(pal.muted)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .style(Style::default().bg(pal.lane_bg))
        .title(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    app.hits.register(Hook::Column(bucket), area);

    let visible = (inner.height / CARD_HEIGHT).max(1) as usize;
    let offset = if focused && app.cursor.index >= visible {
        app.cursor.index + 1 - visible
    } else {
        0
    };

    let dragged = app.engine.session().map(|s| s.issue_id);
    let issues: Vec<Issue> = app
        .board
        .lane(bucket)
        .iter()
        .skip(offset)
        .take(visible)
        .cloned()
        .collect();

    let mut y = inner.y;
    for (n, issue) in issues.iter().enumerate() {
        let rect = Rect::new(inner.x, y, inner.width, CARD_HEIGHT.min(inner.bottom() - y));
        let selected = focused && app.cursor.index == offset + n;
        let style = card_style(pal, selected, dragged == Some(issue.id));
        render_card(frame, issue, rect, style, pal);
        app.hits.register(Hook::Issue(issue.id), rect);
        if rect.width > 4 {
            let link = Rect::new(rect.right() - 3, rect.y + 1, 2, 1);
            app.hits.register(Hook::IssueLink(issue.id), link);
        }
        y += CARD_HEIGHT;
    }

    // End-of-lane drop slot.
    if focused && app.engine.is_dragging() && app.cursor.index == count && y < inner.bottom() {
        let slot = Rect::new(inner.x, y, inner.width, 1);
        frame.render_widget(
            Paragraph::new(Span::styled(
                "── drop here ──",
                Style::default().fg(pal.accent),
            ))
            .alignment(ratatui::layout::Alignment::Center),
            slot,
        );
    }
}

fn card_style(pal: &Palette, selected: bool, dragged: bool) -> Style {
    if dragged {
        Style::default().fg(pal.muted).add_modifier(Modifier::DIM)
    } else if selected {
        Style::default().fg(pal.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(pal.fg)
    }
}

fn render_card(frame: &mut Frame, issue: &Issue, rect: Rect, border: Style, pal: &Palette) {
    let width = rect.width.saturating_sub(2) as usize;
    let heading = format!("#{} {}", issue.number, issue.title);
    let lines = vec![
        Line::from(vec![
            Span::styled(
                truncate(&heading, width.saturating_sub(3)),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(LINK_MARKER, Style::default().fg(pal.accent)),
        ]),
        Line::from(Span::styled(
            truncate(
                &format!(
                    "{} · {} Comments · Opened: {}",
                    issue.user.login,
                    issue.comments,
                    issue.opened_display()
                ),
                width,
            ),
            Style::default().fg(pal.muted),
        )),
    ];
    let card = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).border_style(border));
    frame.render_widget(card, rect);
}

/// Floating copy of the dragged card, sized like the original.
fn render_preview(frame: &mut Frame, app: &App, pal: &Palette, lanes: Rect) {
    let Some(issue) = app.engine.active_issue(&app.board) else {
        return;
    };
    let size = app.engine.overlay();
    let width = size.map(|s| s.width).unwrap_or(lanes.width / 3).max(10);
    let height = size.map(|s| s.height).unwrap_or(CARD_HEIGHT);

    let (x, y) = match app.pointer {
        Some(pos) => pos,
        None => {
            // Keyboard drag: float next to the drop slot.
            let anchor = app
                .board
                .lane(app.cursor.bucket)
                .get(app.cursor.index)
                .and_then(|i| app.hits.rect(Hook::Issue(i.id)))
                .or_else(|| app.hits.rect(Hook::Column(app.cursor.bucket)))
                .unwrap_or(lanes);
            (anchor.x + 2, anchor.y + 1)
        }
    };

    let screen = frame.area();
    let x = x.min(screen.right().saturating_sub(width));
    let y = y.min(screen.bottom().saturating_sub(height));
    let rect = Rect::new(x, y, width.min(screen.width), height.min(screen.height));
    frame.render_widget(Clear, rect);
    render_card(
        frame,
        issue,
        rect,
        Style::default().fg(pal.accent).add_modifier(Modifier::BOLD),
        pal,
    );
}

fn render_help(frame: &mut Frame, app: &App, pal: &Palette, area: Rect) {
    let text = if app.editing {
        "Enter: load  Esc: done  type the repository URL"
    } else if app.engine.is_dragging() {
        "←↑↓→: choose slot  Space/Enter: drop  Esc: cancel"
    } else if app.is_narrow() {
        "Tab/[ ]: lane  ↑↓: select  Space: pick up  o: open  /: url  r: load  R: reset  t: theme  q: quit"
    } else {
        "←↑↓→: select  Space: pick up  o: open  /: url  r: load  R: reset  t: theme  q: quit"
    };
    frame.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(pal.muted))),
        area,
    );
}
