use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use atlas_core::layout::{SegmentLayout, group_phases};
use atlas_core::views::timeline::render_timeline;
use atlas_core::{Atlas, GeometryRegistry, Reaction, SelectionCoordinator};
use atlas_protocol::{RenderCommand, ScrollBehavior, ScrollCommand, TextAlign, ThemeToken, Viewport};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::debug;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Pixels represented by one terminal column.
const PX_PER_COL: f64 = 8.0;
/// Track height handed to the view transform (px).
const TRACK_HEIGHT_PX: f64 = 48.0;
/// Phase label row, two segment rows, underline row.
const TRACK_ROWS: u16 = 4;
const FRAME: Duration = Duration::from_millis(16);
const SCROLL_STEP_PX: f64 = 48.0;
const SMOOTH_SCROLL_MS: f64 = 240.0;

fn theme_to_color(token: &ThemeToken) -> Color {
    match token {
        ThemeToken::PhaseResearch => Color::Rgb(90, 140, 220),
        ThemeToken::PhaseIdeation => Color::Rgb(160, 110, 220),
        ThemeToken::PhaseDesign => Color::Rgb(220, 100, 160),
        ThemeToken::PhasePrototype => Color::Rgb(230, 150, 70),
        ThemeToken::PhaseBuild => Color::Rgb(220, 190, 70),
        ThemeToken::PhaseTest => Color::Rgb(100, 190, 120),
        ThemeToken::PhaseLaunch => Color::Rgb(70, 180, 190),
        ThemeToken::TrackBackground => Color::Black,
        ThemeToken::TrackBorder => Color::DarkGray,
        ThemeToken::PhaseLabel => Color::Gray,
        ThemeToken::PhaseSeparator => Color::DarkGray,
        ThemeToken::SegmentText => Color::Black,
        ThemeToken::TextPrimary => Color::White,
        ThemeToken::TextMuted => Color::DarkGray,
        ThemeToken::SelectionHighlight => Color::White,
        ThemeToken::FocusHighlight => Color::LightYellow,
        ThemeToken::Background => Color::Black,
        ThemeToken::Border => Color::DarkGray,
        ThemeToken::CardBackground => Color::Black,
        ThemeToken::CardExpanded => Color::Rgb(20, 20, 30),
        ThemeToken::CardBorder => Color::Gray,
    }
}

fn px_to_cols(px: f64) -> i32 {
    (px / PX_PER_COL).round() as i32
}

fn cols_to_px(cols: u16) -> f64 {
    f64::from(cols) * PX_PER_COL
}

/// An in-flight programmatic scroll of the gallery strip.
#[derive(Debug, Clone, Copy)]
struct ScrollAnimation {
    from: f64,
    to: f64,
    started_at: f64,
    duration: f64,
}

impl ScrollAnimation {
    fn position(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = ((now - self.started_at) / self.duration).clamp(0.0, 1.0);
        // Ease-out cubic.
        let eased = 1.0 - (1.0 - t).powi(3);
        self.from + (self.to - self.from) * eased
    }

    fn finished(&self, now: f64) -> bool {
        now - self.started_at >= self.duration
    }
}

/// Terminal host: owns the scroll position the way a browser owns the
/// gallery container's `scrollLeft`, and feeds it to the coordinator.
struct Browser {
    coordinator: SelectionCoordinator,
    scroll_left: f64,
    animation: Option<ScrollAnimation>,
    clock: Instant,
}

impl Browser {
    fn new(atlas: Atlas, viewport_width: f64) -> Self {
        let Atlas { config, timeline } = atlas;
        let geometry = GeometryRegistry::for_timeline(&timeline, &config, viewport_width);
        Self {
            coordinator: SelectionCoordinator::new(timeline, geometry, config),
            scroll_left: 0.0,
            animation: None,
            clock: Instant::now(),
        }
    }

    fn now(&self) -> f64 {
        self.clock.elapsed().as_secs_f64() * 1000.0
    }

    fn start_scroll(&mut self, command: &ScrollCommand) {
        let to = self.coordinator.geometry().clamp_scroll(command.target);
        let duration = match command.behavior {
            ScrollBehavior::Smooth => SMOOTH_SCROLL_MS,
            ScrollBehavior::Instant => 0.0,
        };
        debug!(
            "scroll to {} ({to:.0}px, generation {})",
            command.item_id, command.generation
        );
        self.animation = Some(ScrollAnimation {
            from: self.scroll_left,
            to,
            started_at: self.now(),
            duration,
        });
    }

    fn apply(&mut self, reaction: Reaction) {
        if let Some(command) = &reaction.scroll {
            self.start_scroll(command);
        }
    }

    /// Manual scroll: cancels any animation in flight.
    fn scroll_by(&mut self, delta: f64) {
        self.animation = None;
        self.scroll_left = self
            .coordinator
            .geometry()
            .clamp_scroll(self.scroll_left + delta);
        let now = self.now();
        let reaction = self.coordinator.on_scroll(self.scroll_left, now);
        self.apply(reaction);
    }

    /// Advance the animation one frame and report the position.
    fn tick(&mut self) {
        let now = self.now();
        if let Some(animation) = self.animation {
            self.scroll_left = animation.position(now);
            if animation.finished(now) {
                self.animation = None;
            }
            let reaction = self.coordinator.on_scroll(self.scroll_left, now);
            self.apply(reaction);
        }
        let reaction = self.coordinator.on_frame(self.scroll_left, now);
        if reaction.settled {
            debug!("programmatic scroll settled at {:.0}px", self.scroll_left);
        }
    }

    fn resize(&mut self, cols: u16) {
        self.coordinator.resize(cols_to_px(cols));
        self.scroll_left = self.coordinator.geometry().clamp_scroll(self.scroll_left);
    }

    fn click_segment_at(&mut self, index: usize) {
        let Some(id) = self
            .coordinator
            .timeline()
            .segments()
            .get(index)
            .map(|s| s.id.clone())
        else {
            return;
        };
        let now = self.now();
        let reaction = self.coordinator.click_segment(&id, now);
        self.apply(reaction);
    }

    /// Tab / BackTab: move the highlight one segment along the timeline.
    fn step_segment(&mut self, forward: bool) {
        let count = self.coordinator.timeline().segments().len();
        if count == 0 {
            return;
        }
        let current = self
            .coordinator
            .state()
            .active_segment
            .as_ref()
            .and_then(|id| self.coordinator.timeline().segment_position(id));
        let next = match (current, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % count,
            (Some(i), false) => (i + count - 1) % count,
        };
        self.click_segment_at(next);
    }

    fn open_focused(&mut self) {
        let Some(id) = self.coordinator.state().focused_item.clone() else {
            return;
        };
        let now = self.now();
        let reaction = self.coordinator.click_item(&id, now);
        self.apply(reaction);
    }

    fn click_track(&mut self, track_x_px: f64, track_width: f64) {
        let layout = SegmentLayout::compute(
            self.coordinator.timeline().segments(),
            track_width,
            self.coordinator.config(),
        );
        let Some(id) = layout.segment_at(track_x_px).cloned() else {
            return;
        };
        let now = self.now();
        let reaction = self.coordinator.click_segment(&id, now);
        self.apply(reaction);
    }

    fn click_gallery(&mut self, x_px: f64) {
        let Some(id) = self
            .coordinator
            .geometry()
            .item_at(self.scroll_left + x_px)
            .cloned()
        else {
            return;
        };
        let now = self.now();
        let reaction = self.coordinator.click_item(&id, now);
        self.apply(reaction);
    }
}

pub fn run_tui(atlas: Atlas) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = browse(&mut terminal, atlas);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn browse(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, atlas: Atlas) -> Result<()> {
    let size = terminal.size()?;
    let mut browser = Browser::new(atlas, cols_to_px(size.width));
    let mut last_width = size.width;

    loop {
        let size = terminal.size()?;
        if size.width != last_width {
            browser.resize(size.width);
            last_width = size.width;
        }
        let track_width = cols_to_px(size.width);

        browser.tick();

        let coordinator = &browser.coordinator;
        let layout =
            SegmentLayout::compute(coordinator.timeline().segments(), track_width, coordinator.config());
        let groups = group_phases(coordinator.timeline().segments(), &layout.widths(), layout.gap);
        let commands = render_timeline(
            coordinator.timeline(),
            &layout,
            &groups,
            coordinator.state(),
            &Viewport::new(track_width, TRACK_HEIGHT_PX),
        );

        terminal.draw(|frame| {
            draw_header(frame, &browser);
            draw_track(frame, &commands);
            draw_gallery(frame, &browser);
            draw_status(frame, &browser);
        })?;

        if !event::poll(FRAME)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') => break,
                KeyCode::Esc => {
                    let reaction = browser.coordinator.collapse();
                    browser.apply(reaction);
                }
                KeyCode::Left => browser.scroll_by(-SCROLL_STEP_PX),
                KeyCode::Right => browser.scroll_by(SCROLL_STEP_PX),
                KeyCode::Tab => browser.step_segment(true),
                KeyCode::BackTab => browser.step_segment(false),
                KeyCode::Enter | KeyCode::Char(' ') => browser.open_focused(),
                KeyCode::Char(c @ '1'..='9') => {
                    let index = c as usize - '1' as usize;
                    browser.click_segment_at(index);
                }
                _ => {}
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollLeft | MouseEventKind::ScrollUp => {
                    browser.scroll_by(-SCROLL_STEP_PX / 2.0);
                }
                MouseEventKind::ScrollRight | MouseEventKind::ScrollDown => {
                    browser.scroll_by(SCROLL_STEP_PX / 2.0);
                }
                MouseEventKind::Down(MouseButton::Left) => {
                    let x_px = cols_to_px(mouse.column) + PX_PER_COL / 2.0;
                    if (1..=TRACK_ROWS).contains(&mouse.row) {
                        browser.click_track(x_px, track_width);
                    } else if mouse.row > TRACK_ROWS + 1 {
                        browser.click_gallery(x_px);
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    Ok(())
}

fn draw_header(frame: &mut Frame, browser: &Browser) {
    let area = frame.area();
    let timeline = browser.coordinator.timeline();
    let header = Block::default()
        .title(format!(
            " atlas — {} methods, {} cards | ←→ scroll | tab/1-9 method | enter open | esc close | q quit ",
            timeline.segments().len(),
            timeline.items().len()
        ))
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));
    frame.render_widget(header, Rect::new(0, 0, area.width, 1));
}

/// Map the timeline's render commands onto the track rows. Vertical
/// placement is by command role rather than by y coordinate: labels and
/// separators on the first row, segments on the next two, the active
/// underline on the last.
fn draw_track(frame: &mut Frame, commands: &[RenderCommand]) {
    let area = frame.area();
    let label_row = 1;
    let segment_rows = [2, 3];
    let underline_row = TRACK_ROWS;
    if area.height <= underline_row {
        return;
    }
    let width = i32::from(area.width);
    let buf = frame.buffer_mut();

    let mut put = |col: i32, row: u16, ch: char, style: Style| {
        if (0..width).contains(&col) {
            buf[(col as u16, row)].set_char(ch).set_style(style);
        }
    };

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                border_color,
                label,
                segment_id: Some(_),
            } => {
                let start = px_to_cols(rect.x);
                let end = px_to_cols(rect.right()).max(start + 1);
                let mut style = Style::default()
                    .fg(theme_to_color(&ThemeToken::SegmentText))
                    .bg(theme_to_color(color));
                if border_color.is_some() {
                    style = style.add_modifier(Modifier::BOLD);
                }
                let text: Vec<char> = label.as_deref().unwrap_or("").chars().collect();
                for col in start..end {
                    // Leave the last column as a visible gap.
                    if col == end - 1 && end - start > 1 {
                        continue;
                    }
                    let offset = (col - start - 1).max(-1);
                    let ch = usize::try_from(offset)
                        .ok()
                        .and_then(|i| text.get(i).copied())
                        .filter(|_| end - start > 2)
                        .unwrap_or(' ');
                    put(col, segment_rows[0], ch, style);
                    put(col, segment_rows[1], ' ', style);
                }
            }
            RenderCommand::DrawLine {
                from, to, color, ..
            } => {
                let style = Style::default().fg(theme_to_color(color));
                if *color == ThemeToken::SelectionHighlight {
                    for col in px_to_cols(from.x)..px_to_cols(to.x) {
                        put(col, underline_row, '▀', style);
                    }
                } else {
                    put(px_to_cols(from.x), label_row, '│', style);
                }
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                align,
                ..
            } => {
                let len = text.chars().count() as i32;
                let anchor = px_to_cols(position.x);
                let start = match align {
                    TextAlign::Left => anchor,
                    TextAlign::Center => anchor - len / 2,
                    TextAlign::Right => anchor - len,
                };
                let style = Style::default().fg(theme_to_color(color));
                for (i, ch) in text.chars().enumerate() {
                    put(start + i as i32, label_row, ch, style);
                }
            }
            _ => {}
        }
    }
}

fn draw_gallery(frame: &mut Frame, browser: &Browser) {
    let area = frame.area();
    let top = TRACK_ROWS + 2;
    if area.height <= top + 3 {
        return;
    }
    let height = area.height - top - 1;
    let coordinator = &browser.coordinator;
    let state = coordinator.state();
    let geometry = coordinator.geometry();

    for id in geometry.ids() {
        let (Some(g), Some(item)) = (geometry.get(id), coordinator.timeline().item(id)) else {
            continue;
        };
        let expanded = state.is_expanded(id);
        let start = px_to_cols(g.left - browser.scroll_left);
        let end = px_to_cols(g.left + g.effective_width(expanded) - browser.scroll_left);
        let (x0, x1) = (start.max(0), end.min(i32::from(area.width)));
        if x1 - x0 < 2 {
            continue;
        }
        let rect = Rect::new(x0 as u16, top, (x1 - x0) as u16, height);

        let phase = coordinator
            .timeline()
            .owning_segment(id)
            .map(|s| theme_to_color(&s.phase.theme_token()))
            .unwrap_or(Color::Gray);
        let focused = state.focused_item.as_ref() == Some(id);
        let border = if expanded {
            Style::default()
                .fg(theme_to_color(&ThemeToken::SelectionHighlight))
                .add_modifier(Modifier::BOLD)
        } else if focused {
            Style::default().fg(theme_to_color(&ThemeToken::FocusHighlight))
        } else {
            Style::default().fg(theme_to_color(&ThemeToken::CardBorder))
        };
        let background = if expanded {
            ThemeToken::CardExpanded
        } else {
            ThemeToken::CardBackground
        };

        let mut lines = vec![Line::from(Span::styled(
            item.card.title.clone(),
            Style::default().fg(phase).add_modifier(Modifier::BOLD),
        ))];
        if let Some(summary) = &item.card.summary {
            lines.push(Line::from(summary.clone()));
        }
        if expanded && let Some(detail) = &item.detail {
            lines.push(Line::default());
            if let Some(heading) = &detail.heading {
                lines.push(Line::from(Span::styled(
                    heading.clone(),
                    Style::default().add_modifier(Modifier::UNDERLINED),
                )));
            }
            lines.extend(detail.body.iter().map(|p| Line::from(p.clone())));
            if !detail.tags.is_empty() {
                lines.push(Line::from(Span::styled(
                    detail.tags.join(" · "),
                    Style::default().fg(theme_to_color(&ThemeToken::TextMuted)),
                )));
            }
        }

        let card = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .style(Style::default().bg(theme_to_color(&background)))
            .block(Block::default().borders(Borders::ALL).border_style(border));
        frame.render_widget(card, rect);
    }
}

fn draw_status(frame: &mut Frame, browser: &Browser) {
    let area = frame.area();
    if area.height < 2 {
        return;
    }
    let coordinator = &browser.coordinator;
    let state = coordinator.state();
    let label = |id: Option<&str>| id.unwrap_or("-").to_string();
    let active = state
        .active_segment
        .as_ref()
        .and_then(|id| coordinator.timeline().segment(id))
        .map(|s| s.label.as_str());
    let mut spans = vec![
        Span::raw(format!(" method: {} ", label(active))),
        Span::raw(format!("| card: {} ", label(state.focused_item.as_deref()))),
    ];
    if let Some(expanded) = &state.expanded_item {
        spans.push(Span::styled(
            format!("| open: {expanded} "),
            Style::default().fg(theme_to_color(&ThemeToken::SelectionHighlight)),
        ));
    }
    if coordinator.is_programmatic_scroll() {
        spans.push(Span::styled(
            "| scrolling… ",
            Style::default().fg(theme_to_color(&ThemeToken::TextMuted)),
        ));
    }
    spans.push(Span::raw(format!(
        "| {:.0}/{:.0}px",
        browser.scroll_left,
        coordinator.geometry().max_scroll()
    )));
    let status = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));
    frame.render_widget(status, Rect::new(0, area.height - 1, area.width, 1));
}
