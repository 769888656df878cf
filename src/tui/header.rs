use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState},
    Frame,
};
use unicode_width::UnicodeWidthStr;

pub const APP_TITLE: &str = "类案检索";

/// Top-level pages reachable from the navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Search,
    Archive,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Home, Page::Search, Page::Archive];

    pub fn label(self) -> &'static str {
        match self {
            Page::Home => "首页",
            Page::Search => "检索",
            Page::Archive => "档案",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Page::Home => "⌂",
            Page::Search => "⌕",
            Page::Archive => "▤",
        }
    }
}

/// Navigation header; collapses into a sidebar on narrow terminals
pub struct Header {
    sidebar_open: bool,
    selected: usize,
}

impl Header {
    pub fn new() -> Self {
        Self {
            sidebar_open: false,
            selected: 0,
        }
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn open_sidebar(&mut self, current: Page) {
        self.sidebar_open = true;
        self.selected = Page::ALL.iter().position(|p| *p == current).unwrap_or(0);
    }

    pub fn close_sidebar(&mut self) {
        self.sidebar_open = false;
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.checked_sub(1).unwrap_or(Page::ALL.len() - 1);
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % Page::ALL.len();
    }

    /// Close the sidebar and return the page it had selected
    pub fn confirm(&mut self) -> Page {
        self.sidebar_open = false;
        Page::ALL[self.selected]
    }

    /// Render the one-line header bar
    pub fn render(&self, frame: &mut Frame, area: Rect, current: Page, wide: bool) {
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let title = Span::styled(
            format!(" {APP_TITLE} "),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        );

        if !wide {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(1), Constraint::Length(10)])
                .split(inner);
            frame.render_widget(Line::from(title), chunks[0]);
            frame.render_widget(
                Line::from(Span::styled("☰ Ctrl+O", Style::default().fg(Color::Gray)))
                    .alignment(Alignment::Right),
                chunks[1],
            );
            return;
        }

        let mut spans = vec![title, Span::raw("  ")];
        for (i, page) in Page::ALL.iter().enumerate() {
            let style = if *page == current {
                Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!(" {} {} ", page.icon(), page.label()), style));
            spans.push(Span::styled(
                format!("Alt+{} ", i + 1),
                Style::default().fg(Color::DarkGray),
            ));
        }
        frame.render_widget(Line::from(spans), inner);
    }

    /// Render the sidebar overlay on the right edge
    pub fn render_sidebar(&self, frame: &mut Frame, area: Rect) {
        let content_width = Page::ALL
            .iter()
            .map(|p| p.label().width() + 4)
            .chain(std::iter::once(APP_TITLE.width()))
            .max()
            .unwrap_or(0) as u16;
        let width = (content_width + 6).min(area.width);
        let height = (Page::ALL.len() as u16 + 4).min(area.height);
        let sidebar = Rect {
            x: area.x + area.width - width,
            y: area.y,
            width,
            height,
        };

        let items: Vec<ListItem> = Page::ALL
            .iter()
            .map(|p| ListItem::new(format!("{} {}", p.icon(), p.label())))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(Line::from(APP_TITLE).alignment(Alignment::Center))
                    .border_style(Style::default().fg(Color::LightBlue)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("▶ ");

        let mut state = ListState::default().with_selected(Some(self.selected));
        frame.render_widget(Clear, sidebar);
        frame.render_stateful_widget(list, sidebar, &mut state);
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}
