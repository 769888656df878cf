use crate::api::SearchBackend;
use crate::event::{Event, EventResult};
use crate::layout::{Viewport, WidthWatch, WIDE_LAYOUT_MIN_COLUMNS};
use crate::search::SearchController;
use crate::tui::{render_faq, Header, Page, SearchPanel};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use std::sync::Arc;

/// Main application state
pub struct App {
    /// Search form state and submissions
    controller: SearchController,
    /// Search tool widget
    panel: SearchPanel,
    /// Navigation header and sidebar
    header: Header,
    /// Current terminal width, fed by resize events
    viewport: Viewport,
    /// Whether the header has room for inline navigation
    wide: WidthWatch,
    /// Page being shown
    page: Page,
    /// Whether the application should quit
    should_quit: bool,
}

impl App {
    /// Create a new application for a terminal `width` columns wide
    pub fn new(backend: Arc<dyn SearchBackend>, width: u16) -> Self {
        let viewport = Viewport::new(width);
        let wide = viewport.within(WIDE_LAYOUT_MIN_COLUMNS..);

        Self {
            controller: SearchController::new(backend),
            panel: SearchPanel::new(),
            header: Header::new(),
            viewport,
            wide,
            page: Page::Home,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn controller(&self) -> &SearchController {
        &self.controller
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Whether the header currently shows inline navigation
    pub fn is_wide(&mut self) -> bool {
        self.wide.get()
    }

    /// Fold in finished background work
    pub fn poll_search(&mut self) {
        if self.controller.poll() > 0 {
            self.panel.sync(self.controller.state());
        }
    }

    /// Handle an event
    pub fn handle_event(&mut self, event: Event) -> EventResult<()> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Resize(cols, _) => {
                self.viewport.set_width(cols);
                if self.wide.get() {
                    self.header.close_sidebar();
                }
            }
            Event::Tick => self.poll_search(),
            Event::Quit => self.should_quit = true,
        }
        Ok(())
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.header.sidebar_open() {
            match key.code {
                KeyCode::Esc => self.header.close_sidebar(),
                KeyCode::Up => self.header.select_previous(),
                KeyCode::Down => self.header.select_next(),
                KeyCode::Enter => self.page = self.header.confirm(),
                _ => {}
            }
            return;
        }

        if key.modifiers.contains(KeyModifiers::ALT) {
            if let KeyCode::Char(c @ '1'..='3') = key.code {
                let index = c as usize - '1' as usize;
                self.page = Page::ALL[index];
                return;
            }
        }

        match key.code {
            KeyCode::Char('o') if ctrl => {
                if !self.wide.get() {
                    self.header.open_sidebar(self.page);
                }
            }
            _ if self.page == Page::Archive => {}
            KeyCode::F(2) => {
                let mode = self.controller.state().mode().toggle();
                self.controller.set_mode(mode);
            }
            KeyCode::Esc => {
                let mode = self.controller.state().mode();
                self.controller.dismiss_instructions(mode);
            }
            _ => self.panel.handle_key(key, &mut self.controller),
        }
    }

    /// Render the application UI
    pub fn render(&mut self, frame: &mut Frame) {
        let wide = self.wide.get();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Header
                Constraint::Min(5),    // Page
                Constraint::Length(1), // Key hints
            ])
            .split(frame.area());

        self.header.render(frame, chunks[0], self.page, wide);

        match self.page {
            Page::Home => self.render_home(frame, chunks[1], wide),
            Page::Search => self.panel.render(frame, chunks[1], self.controller.state()),
            Page::Archive => render_archive(frame, chunks[1]),
        }

        render_hints(frame, chunks[2]);

        if self.header.sidebar_open() {
            self.header.render_sidebar(frame, chunks[1]);
        }
    }

    /// Search tool beside the FAQ, stacked when narrow
    fn render_home(&mut self, frame: &mut Frame, area: Rect, wide: bool) {
        let chunks = if wide {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
                .split(area)
        } else {
            Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(12), Constraint::Length(8)])
                .split(area)
        };

        self.panel.render(frame, chunks[0], self.controller.state());
        render_faq(frame, chunks[1]);
    }
}

fn render_archive(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new("档案功能暂未开放。").block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" ▤ 档案 ")
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(paragraph, area);
}

fn render_hints(frame: &mut Frame, area: Rect) {
    let hint = Style::default().fg(Color::DarkGray);
    let line = Line::from(vec![
        Span::styled("Ctrl+C", Style::default().fg(Color::Yellow)),
        Span::styled(" 退出 │ ", hint),
        Span::styled("F2", Style::default().fg(Color::Yellow)),
        Span::styled(" 切换模式 │ ", hint),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::styled(" 关闭说明 │ ", hint),
        Span::styled("Alt+1..3", Style::default().fg(Color::Yellow)),
        Span::styled(" 页面", hint),
    ]);
    frame.render_widget(line, area);
}
