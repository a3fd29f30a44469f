pub mod charting;

use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use shipwrecked::entity::{
    EntitySnapshot, Rgb, WordTint, ACCENT, FIELD_HEIGHT, FIELD_WIDTH, PLAIN, REMOVAL_RISE,
    TEXT_OFFSET, WATER,
};
use shipwrecked::game::{GameSession, PromptKind};
use shipwrecked::level::LevelSummary;

const HORIZONTAL_MARGIN: u16 = 2;

const BOTTLES: [&str; 3] = ["=[]>", "=()>", "={}>"];

const SHIP: [&str; 4] = ["    |\\    ", "    | \\   ", " ___|__\\__", " \\_______/"];

fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.0, color.1, color.2)
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn accent() -> Style {
    bold().fg(rgb(ACCENT))
}

fn water() -> Style {
    Style::default().fg(rgb(WATER))
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn to_col(x: f64, width: u16) -> i32 {
    (x / FIELD_WIDTH * width as f64).round() as i32
}

fn to_row(y: f64, height: u16) -> i32 {
    (y / FIELD_HEIGHT * height as f64).round() as i32
}

/// Writes `text` starting at a possibly off-screen column, clipping to `area`.
fn put_str(buf: &mut Buffer, area: Rect, col: i32, row: i32, text: &str, style: Style) {
    if row < 0 || row >= area.height as i32 {
        return;
    }
    let mut col = col;
    for c in text.chars() {
        let width = c.width().unwrap_or(0) as i32;
        if col >= 0 && col + width <= area.width as i32 {
            if let Some(cell) = buf.cell_mut((area.x + col as u16, area.y + row as u16)) {
                cell.set_symbol(&c.to_string());
                cell.set_style(style);
            }
        }
        col += width;
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn render_entity(snap: &EntitySnapshot, field: Rect, buf: &mut Buffer) {
    let rise = match snap.tint {
        WordTint::Fading { rise, .. } => rise,
        WordTint::Highlight { .. } => 0.0,
    };
    let col = to_col(snap.x, field.width);
    let lane_row = to_row(snap.y + TEXT_OFFSET + rise, field.height);
    let word_row = lane_row - 1 - (rise / REMOVAL_RISE).round() as i32;

    let bottle = BOTTLES[(snap.sprite.max(1) as usize - 1) % BOTTLES.len()];
    put_str(buf, field, col, lane_row, bottle, water());

    if !snap.shows_word {
        return;
    }
    let start = col + (bottle.width() as i32 - snap.word.width() as i32) / 2;
    match snap.tint {
        WordTint::Highlight { matched } => {
            let split = snap
                .word
                .char_indices()
                .nth(matched)
                .map_or(snap.word.len(), |(i, _)| i);
            let (done, rest) = snap.word.split_at(split);
            put_str(buf, field, start, word_row, done, accent());
            put_str(
                buf,
                field,
                start + done.width() as i32,
                word_row,
                rest,
                bold().fg(rgb(PLAIN)),
            );
        }
        WordTint::Fading { color, .. } => {
            put_str(buf, field, start, word_row, &snap.word, bold().fg(rgb(color)));
        }
    }
}

fn render_flyout(text: &str, progress: f64, field: Rect, buf: &mut Buffer) {
    let len = text.width() as f64;
    let travel = field.width as f64 + len;
    let col = (field.width as f64 - progress * travel).round() as i32;
    put_str(buf, field, col, field.height as i32 / 2, text, accent());
}

fn render_ship(progress: f64, field: Rect, buf: &mut Buffer) {
    let ship_width = SHIP[0].width() as f64;
    let from = field.width as f64;
    let to = (field.width as f64 - ship_width) / 2.0;
    let col = (from - progress * (from - to)).round() as i32;
    let top = field.height as i32 / 2 - SHIP.len() as i32;
    for (i, line) in SHIP.iter().enumerate() {
        put_str(buf, field, col, top + i as i32, line, bold());
    }
}

fn render_panel(lines: Vec<Line>, title: &str, area: Rect, buf: &mut Buffer) {
    let width = 60.min(area.width);
    let inner_width = width.saturating_sub(2).max(1) as usize;
    let wrapped: usize = lines
        .iter()
        .map(|l| l.width().max(1).div_ceil(inner_width))
        .sum();
    let panel = centered(area, width, wrapped as u16 + 2);

    Clear.render(panel, buf);
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(panel, buf);
}

fn summary_lines(summary: &LevelSummary) -> Vec<Line<'static>> {
    let title_style = if summary.missed_any {
        bold().fg(Color::Red)
    } else {
        bold().fg(Color::Green)
    };
    let mut lines = vec![
        Line::from(Span::styled(summary.title(), title_style)),
        Line::from(""),
        Line::from(summary.counts()),
        Line::from(summary.speed()),
        Line::from(""),
        Line::from(Span::styled(
            summary.miss_message.clone(),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ];
    if let Some(attribution) = &summary.attribution {
        lines.push(Line::from(Span::styled(format!("- {attribution}"), dim())));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        if summary.can_advance() {
            "(r)edo / (n)ext level / (x) restart / (esc) quit"
        } else {
            "(r)edo / (x) restart / (esc) quit"
        },
        Style::default().add_modifier(Modifier::ITALIC),
    )));
    lines
}

fn render_speed_chart(session: &GameSession, area: Rect, buf: &mut Buffer) {
    let points = charting::speed_points(session.stats().history());
    let (last_level, highest_wpm) = charting::compute_chart_params(&points);

    let datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(&points)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("level")
                .bounds([1.0, last_level])
                .labels(vec![
                    Span::styled("1", bold()),
                    Span::styled(charting::format_label(last_level), bold()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold()),
                    Span::styled(charting::format_label(highest_wpm), bold()),
                ]),
        )
        .render(area, buf);
}

fn render_game_over(session: &GameSession, field: Rect, buf: &mut Buffer) {
    let panel = centered(field, 60, 14);
    Clear.render(panel, buf);
    let block = Block::default().borders(Borders::ALL).title("Land ho!");
    let inner = block.inner(panel);
    block.render(panel, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

    Paragraph::new(Span::styled(
        format!("Average speed: {} wpm", session.average_speed()),
        accent(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let stats = session.stats();
    let rescued = match stats.best_level_speed() {
        Some(best) => format!(
            "{} words rescued / best level {} wpm",
            stats.total_words_correct(),
            best
        ),
        None => format!("{} words rescued", stats.total_words_correct()),
    };
    Paragraph::new(rescued)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    render_speed_chart(session, chunks[2], buf);

    Paragraph::new(Span::styled(
        "(x) sail again / (esc) quit",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);
}

fn render_prompt(kind: PromptKind, area: Rect, buf: &mut Buffer) {
    let lines = vec![
        Line::from(Span::styled(kind.question(), bold())),
        Line::from(""),
        Line::from(Span::styled("(y)es / (n)o", dim())),
    ];
    let panel = centered(area, 40, lines.len() as u16 + 2);
    Clear.render(panel, buf);
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .render(panel, buf);
}

/// Draws one frame of a running game.
pub fn render_game(session: &GameSession, now: Instant, area: Rect, buf: &mut Buffer) {
    let levels = session.levels();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(5),    // sea
            Constraint::Length(3), // input
            Constraint::Length(1), // legend
        ])
        .split(area);

    let header = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[0]);
    Paragraph::new(Span::styled(
        format!("Level {}/{}", levels.ordinal(), levels.level_count()),
        bold(),
    ))
    .render(header[0], buf);
    Paragraph::new(Span::styled(session.timer_display(now), bold()))
        .alignment(Alignment::Center)
        .render(header[1], buf);
    let sound = if session.is_muted() { "  muted" } else { "" };
    Paragraph::new(Span::styled(
        format!("avg {} wpm{sound}", session.average_speed()),
        dim(),
    ))
    .alignment(Alignment::Right)
    .render(header[2], buf);

    let sea = Block::default().borders(Borders::ALL).border_style(water());
    let field = sea.inner(chunks[1]);
    sea.render(chunks[1], buf);

    for snap in session.snapshots(now) {
        render_entity(&snap, field, buf);
    }
    if let Some(flyout) = levels.flyout() {
        render_flyout(flyout.text(), flyout.progress(now), field, buf);
    }
    if let Some(progress) = session.voyage_progress(now) {
        render_ship(progress, field, buf);
    }

    let input_style = if session.accepts_typing() {
        accent()
    } else {
        dim()
    };
    Paragraph::new(Line::from(vec![
        Span::styled(session.input().text().to_string(), input_style),
        Span::styled("_", dim()),
    ]))
    .block(Block::default().borders(Borders::ALL).title(format!(
        "{}/{}",
        session.input().width(),
        session.input().max_width()
    )))
    .render(chunks[2], buf);

    let legend = if session.is_last_word(now) {
        "(space) submit / (enter) last word / (esc) quit"
    } else {
        "(space) submit / (ctrl+w) clear / (esc) quit"
    };
    Paragraph::new(Span::styled(
        legend,
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[3], buf);

    if let Some(summary) = session.summary() {
        render_panel(summary_lines(summary), "Summary", field, buf);
    }
    if session.is_game_over() && session.voyage_finished(now) {
        render_game_over(session, field, buf);
    }
    if let Some(kind) = session.prompt() {
        render_prompt(kind, area, buf);
    }
}

pub fn render_title(levels: usize, muted: bool, area: Rect, buf: &mut Buffer) {
    let lines = vec![
        Line::from(Span::styled("S H I P W R E C K E D", accent())),
        Line::from(""),
        Line::from("Messages in bottles are drifting past your island."),
        Line::from("Type each word before its bottle floats away."),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{levels} levels / sound {} (tab)",
                if muted { "off" } else { "on" }
            ),
            dim(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "(enter) set sail / (esc) quit",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ];
    let panel = centered(area, 60, lines.len() as u16);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(panel, buf);
}
