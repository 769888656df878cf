use crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders},
    Frame,
};
use tui_textarea::TextArea;

const TITLE: &str = " 检索要求 (Enter=开始生成检索 │ Shift+Enter=换行) ";
const PLACEHOLDER: &str = "请输入案件描述或关键信息...";

/// Multi-line free-text input for auto search, wrapping tui-textarea
pub struct FreeTextInput {
    textarea: TextArea<'static>,
}

impl FreeTextInput {
    pub fn new() -> Self {
        let mut textarea = TextArea::default();
        textarea.set_placeholder_text(PLACEHOLDER);
        textarea.set_cursor_line_style(Style::default());
        Self { textarea }
    }

    /// Feed a key; returns true when the text changed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.textarea.input(key)
    }

    /// Current text, lines joined with `\n`
    pub fn text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    /// Render; a busy input gets a dimmed border and no cursor
    pub fn render(&mut self, frame: &mut Frame, area: Rect, busy: bool) {
        let border = if busy { Color::DarkGray } else { Color::LightBlue };
        self.textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(Span::styled(
                    TITLE,
                    Style::default()
                        .fg(Color::LightBlue)
                        .add_modifier(Modifier::BOLD),
                ))
                .border_style(Style::default().fg(border)),
        );
        self.textarea.set_cursor_style(if busy {
            Style::default()
        } else {
            Style::default().add_modifier(Modifier::REVERSED)
        });
        frame.render_widget(&self.textarea, area);
    }
}

impl Default for FreeTextInput {
    fn default() -> Self {
        Self::new()
    }
}
