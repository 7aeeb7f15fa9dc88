use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap};
use ratatui::{Frame, Terminal};
use recfolders::config::Config;
use recfolders::folder::FolderId;
use recfolders::logging;
use recfolders::organizer::{FormKind, NotificationKind};
use recfolders::render_tree::{row_index_of, RenderRow, RenderView};
use recfolders::{FolderOrganizer, HttpFolderApi};
use std::io::{self, stdout};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "recfolders-tui", version, about = "Browse and organize recording folders")]
struct Cli {
    #[command(flatten)]
    config: Config,
}

#[derive(Default, Clone, Copy)]
struct UiLayoutState {
    tree_inner_area: Option<Rect>,
    scroll: usize,
}

struct App {
    organizer: FolderOrganizer,
    ui_layout: UiLayoutState,
    should_quit: bool,
}

impl App {
    fn new(organizer: FolderOrganizer) -> Self {
        Self {
            organizer,
            ui_layout: UiLayoutState::default(),
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
            self.should_quit = true;
            return;
        }

        if self.organizer.pending_delete().is_some() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    let _ = self.organizer.confirm_delete();
                }
                KeyCode::Char('n') | KeyCode::Esc => self.organizer.cancel_delete(),
                _ => {}
            }
            return;
        }

        if self.organizer.form().is_some() {
            match key.code {
                KeyCode::Enter => {
                    let _ = self.organizer.submit_form();
                }
                KeyCode::Esc => self.organizer.cancel_form(),
                KeyCode::Backspace => {
                    if let Some(input) = self.organizer.form_input_mut() {
                        input.pop();
                    }
                }
                KeyCode::Char(ch) => {
                    if let Some(input) = self.organizer.form_input_mut() {
                        input.push(ch);
                    }
                }
                _ => {}
            }
            return;
        }

        let cursor = self.organizer.cursor();
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.organizer.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.organizer.move_cursor(1),
            KeyCode::PageUp => self.organizer.move_cursor(-10),
            KeyCode::PageDown => self.organizer.move_cursor(10),
            KeyCode::Char(' ') => self.organizer.toggle_cursor(),
            KeyCode::Right | KeyCode::Char('l') => self.organizer.expand_cursor(),
            KeyCode::Left | KeyCode::Char('h') => self.organizer.collapse_cursor(),
            KeyCode::Char('+') => self.organizer.expand_all(),
            KeyCode::Char('-') => self.organizer.collapse_all(),
            KeyCode::Enter | KeyCode::Char('s') => self.organizer.select_cursor(),
            KeyCode::Esc => self.organizer.select(None),
            KeyCode::Char('n') => {
                self.organizer.begin_create(cursor);
            }
            KeyCode::Char('N') => {
                self.organizer.begin_create(None);
            }
            KeyCode::Char('r') => {
                if let Some(id) = cursor {
                    self.organizer.begin_rename(id);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = cursor {
                    self.organizer.request_delete(id);
                }
            }
            KeyCode::Char('R') => self.organizer.reload(),
            _ => {}
        }
    }

    fn on_mouse(&mut self, event: MouseEvent) {
        if self.organizer.form().is_some() || self.organizer.pending_delete().is_some() {
            return;
        }

        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(row) = self.row_at(event.column, event.row) {
                    let marker_x = self
                        .ui_layout
                        .tree_inner_area
                        .map(|area| area.x.saturating_add(row.indent as u16))
                        .unwrap_or(0);
                    self.organizer.move_cursor_to(row.id);
                    if row.has_children && event.column <= marker_x.saturating_add(1) {
                        self.organizer.toggle(row.id);
                    } else {
                        self.organizer.select(Some(row.id));
                    }
                }
            }
            MouseEventKind::ScrollDown => self.organizer.move_cursor(3),
            MouseEventKind::ScrollUp => self.organizer.move_cursor(-3),
            _ => {}
        }
    }

    fn row_at(&self, x: u16, y: u16) -> Option<RenderRow> {
        let area = self.ui_layout.tree_inner_area?;
        if !point_in_rect(area, x, y) {
            return None;
        }
        let index = (y - area.y) as usize + self.ui_layout.scroll;
        self.organizer.view().rows().get(index).cloned()
    }

    /// Scroll just enough to keep the cursor row on screen.
    fn update_scroll(&mut self, rows: &[RenderRow], height: usize) {
        let Some(index) = self.organizer.cursor().and_then(|id| row_index_of(rows, id)) else {
            self.ui_layout.scroll = 0;
            return;
        };
        if height == 0 {
            return;
        }
        if index < self.ui_layout.scroll {
            self.ui_layout.scroll = index;
        } else if index >= self.ui_layout.scroll + height {
            self.ui_layout.scroll = index + 1 - height;
        }
        let max_scroll = rows.len().saturating_sub(height);
        self.ui_layout.scroll = self.ui_layout.scroll.min(max_scroll);
    }
}

fn point_in_rect(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x
        && x < rect.x.saturating_add(rect.width)
        && y >= rect.y
        && y < rect.y.saturating_add(rect.height)
}

fn folder_color(name: Option<&str>) -> Option<Color> {
    let hex = name?.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

struct FolderTreeWidget<'a> {
    rows: &'a [RenderRow],
    cursor: Option<FolderId>,
    scroll: usize,
}

impl Widget for FolderTreeWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        for (line, row) in self.rows.iter().skip(self.scroll).take(area.height as usize).enumerate() {
            let y = area.y + line as u16;
            let is_cursor = self.cursor == Some(row.id);

            let mut style = Style::default().fg(Color::White);
            if row.selected {
                style = style.fg(Color::Rgb(246, 211, 101)).add_modifier(Modifier::BOLD);
            }
            if is_cursor {
                style = style.bg(Color::Rgb(50, 60, 80));
            }

            let swatch_style = folder_color(row.color.as_deref())
                .map(|c| Style::default().fg(c))
                .unwrap_or(style);

            let line = Line::from(vec![
                Span::styled(" ".repeat(row.indent), style),
                Span::styled(format!("{} ", row.marker()), style),
                Span::styled("■ ", swatch_style.bg(style.bg.unwrap_or(Color::Reset))),
                Span::styled(row.label(), style),
            ]);
            buf.set_line(area.x, y, &line, area.width);

            if is_cursor {
                let used = line.width() as u16;
                for x in area.x.saturating_add(used)..area.x.saturating_add(area.width) {
                    buf[(x, y)].set_style(style);
                }
            }
        }
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_ui(frame: &mut Frame, app: &mut App) {
    let root = frame.area();
    let split = Layout::horizontal([Constraint::Min(30), Constraint::Length(44)]).split(root);
    let left = split[0];
    let right = split[1];
    let messages = app.organizer.messages();

    let tree_title = if app.organizer.is_loading() {
        " Folders (loading…) "
    } else {
        " Folders "
    };
    let tree_block = Block::default().title(tree_title).borders(Borders::ALL);
    let tree_inner = tree_block.inner(left);
    frame.render_widget(tree_block, left);
    app.ui_layout.tree_inner_area = Some(tree_inner);

    let view = app.organizer.view();
    match &view {
        RenderView::Empty => {
            frame.render_widget(
                Paragraph::new(messages.no_folders).style(Style::default().fg(Color::Gray)),
                tree_inner,
            );
        }
        RenderView::Rows(rows) => {
            app.update_scroll(rows, tree_inner.height as usize);
            frame.render_widget(
                FolderTreeWidget {
                    rows,
                    cursor: app.organizer.cursor(),
                    scroll: app.ui_layout.scroll,
                },
                tree_inner,
            );
        }
    }

    let right_rows = Layout::vertical([
        Constraint::Length(7),
        Constraint::Min(5),
        Constraint::Length(10),
    ])
    .split(right);

    let tree = app.organizer.tree();
    let filter = app
        .organizer
        .selection()
        .get()
        .and_then(|id| tree.get(id))
        .map(|f| f.name.clone())
        .unwrap_or_else(|| messages.all_recordings.to_string());
    let mut detail_lines = vec![Line::from(vec![
        Span::styled("Filter: ", Style::default().fg(Color::Gray)),
        Span::raw(filter),
    ])];
    if let Some(folder) = app.organizer.cursor().and_then(|id| tree.get(id)) {
        detail_lines.push(Line::from(vec![
            Span::styled("Folder: ", Style::default().fg(Color::Gray)),
            Span::raw(format!("{} (#{})", folder.name, folder.id)),
        ]));
        detail_lines.push(Line::from(vec![
            Span::styled("Recordings: ", Style::default().fg(Color::Gray)),
            Span::raw(folder.recording_count.unwrap_or(0).to_string()),
        ]));
        if let Some(created_by) = folder.created_by.as_deref() {
            detail_lines.push(Line::from(vec![
                Span::styled("Created by: ", Style::default().fg(Color::Gray)),
                Span::raw(created_by.to_string()),
            ]));
        }
        if let Some(created_at) = folder.created_at {
            detail_lines.push(Line::from(vec![
                Span::styled("Created: ", Style::default().fg(Color::Gray)),
                Span::raw(created_at.format("%Y-%m-%d %H:%M").to_string()),
            ]));
        }
    }
    frame.render_widget(
        Paragraph::new(detail_lines).block(Block::default().title(" Selection ").borders(Borders::ALL)),
        right_rows[0],
    );

    let status_lines: Vec<Line> = app
        .organizer
        .notifications()
        .iter()
        .rev()
        .map(|n| {
            let color = match n.kind {
                NotificationKind::Success => Color::Green,
                NotificationKind::Error => Color::Red,
                NotificationKind::Info => Color::Gray,
            };
            Line::from(Span::styled(n.message.clone(), Style::default().fg(color)))
        })
        .collect();
    frame.render_widget(
        Paragraph::new(status_lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().title(" Status ").borders(Borders::ALL)),
        right_rows[1],
    );

    let help_lines = vec![
        Line::from("↑/↓: move    Space: expand/collapse"),
        Line::from("→/←: open/close   +/-: open/close all"),
        Line::from("Enter: filter by folder  Esc: show all"),
        Line::from("n: new subfolder   N: new root folder"),
        Line::from("r: rename   d: delete"),
        Line::from("R: reload   q: quit"),
        Line::from("Click: select   click ▸/▾: toggle"),
    ];
    frame.render_widget(
        Paragraph::new(help_lines).block(Block::default().title(" Controls ").borders(Borders::ALL)),
        right_rows[2],
    );

    if let Some(form) = app.organizer.form() {
        let title = match form.kind {
            FormKind::Create { .. } => messages.new_folder_title,
            FormKind::Rename { .. } => messages.rename_folder_title,
        };
        let input_style = if form.is_submitting() {
            Style::default().fg(Color::Gray)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let popup = centered_rect(root, 50, 3);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(format!("{}▏", form.input))
                .style(input_style)
                .block(Block::default().title(format!(" {} ", title)).borders(Borders::ALL)),
            popup,
        );
    }

    if let Some(pending) = app.organizer.pending_delete() {
        let popup = centered_rect(root, 56, 6);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(vec![Line::from(pending.prompt.clone()), Line::from(""), Line::from("y: delete   n: cancel")])
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .title(format!(" {} ", messages.delete_title))
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Red)),
                ),
            popup,
        );
    }
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, app: &mut App) -> io::Result<()> {
    app.organizer.reload();

    loop {
        app.organizer.poll();
        app.organizer.expire_notifications(NOTIFICATION_TTL);

        terminal.draw(|frame| {
            draw_ui(frame, app);
        })?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => app.on_key(key),
                Event::Mouse(mouse) => app.on_mouse(mouse),
                Event::Resize(_, _) => {}
                Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
            }
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_dir = cli.config.log_dir.clone().unwrap_or_else(std::env::temp_dir);
    let _log_guard = logging::init_file(&log_dir)?;

    let api = HttpFolderApi::from_config(&cli.config)?;
    info!(base_url = %cli.config.base_url, "starting folder navigator");
    let mut app = App::new(FolderOrganizer::new(Arc::new(api), cli.config.locale));

    enable_raw_mode()?;
    crossterm::execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let app_result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &app_result {
        error!(error = %err, "terminal UI failed");
    }
    Ok(app_result?)
}
