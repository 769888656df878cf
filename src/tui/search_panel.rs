use crate::search::{
    query_expression, KeywordField, KeywordGroup, SearchController, SearchMode, SearchState,
    SubmitOutcome, MAX_GROUPS, MIN_GROUPS,
};
use crate::tui::FreeTextInput;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

/// Column of a keyword group row the manual editor is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualField {
    Keyword1,
    Relation,
    Keyword2,
}

impl ManualField {
    fn next(self) -> Self {
        match self {
            ManualField::Keyword1 => ManualField::Relation,
            ManualField::Relation => ManualField::Keyword2,
            ManualField::Keyword2 => ManualField::Keyword1,
        }
    }

    fn previous(self) -> Self {
        match self {
            ManualField::Keyword1 => ManualField::Keyword2,
            ManualField::Relation => ManualField::Keyword1,
            ManualField::Keyword2 => ManualField::Relation,
        }
    }

    fn keyword(self) -> Option<KeywordField> {
        match self {
            ManualField::Keyword1 => Some(KeywordField::Keyword1),
            ManualField::Relation => None,
            ManualField::Keyword2 => Some(KeywordField::Keyword2),
        }
    }
}

/// Search tool panel: mode selector, instructions, editor, submit line
pub struct SearchPanel {
    input: FreeTextInput,
    row: usize,
    field: ManualField,
    status: Option<String>,
    awaiting_auto: bool,
}

impl SearchPanel {
    pub fn new() -> Self {
        Self {
            input: FreeTextInput::new(),
            row: 0,
            field: ManualField::Keyword1,
            status: None,
            awaiting_auto: false,
        }
    }

    /// Selected (row, column) of the manual editor
    pub fn cursor(&self) -> (usize, ManualField) {
        (self.row, self.field)
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Update the status line once an auto search settles
    pub fn sync(&mut self, state: &SearchState) {
        if self.awaiting_auto && !state.is_searching() {
            self.awaiting_auto = false;
            self.status = Some(format!(
                "自动检索已结束，当前共 {} 组关键词（F2 切换到手动检索查看）",
                state.groups().len()
            ));
        }
        self.row = self.row.min(state.groups().len().saturating_sub(1));
    }

    pub fn handle_key(&mut self, key: KeyEvent, controller: &mut SearchController) {
        match controller.state().mode() {
            SearchMode::Auto => self.handle_auto_key(key, controller),
            SearchMode::Manual => self.handle_manual_key(key, controller),
        }
    }

    fn handle_auto_key(&mut self, key: KeyEvent, controller: &mut SearchController) {
        if key.code == KeyCode::Enter && !key.modifiers.contains(KeyModifiers::SHIFT) {
            self.submit(controller);
            return;
        }
        if controller.state().is_searching() {
            return;
        }
        if self.input.handle_key(key) {
            controller.set_free_text(self.input.text());
        }
    }

    fn handle_manual_key(&mut self, key: KeyEvent, controller: &mut SearchController) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let group_count = controller.state().groups().len();

        match key.code {
            KeyCode::Enter => self.submit(controller),
            KeyCode::Up => self.row = self.row.saturating_sub(1),
            KeyCode::Down => self.row = (self.row + 1).min(group_count.saturating_sub(1)),
            KeyCode::Tab => self.field = self.field.next(),
            KeyCode::BackTab => self.field = self.field.previous(),
            KeyCode::Left | KeyCode::Right if self.field == ManualField::Relation => {
                if let Some(group) = self.selected_group(controller.state()) {
                    let (id, relation) = (group.id, group.relation.toggle());
                    controller.set_relation(id, relation);
                }
            }
            KeyCode::Left => self.field = self.field.previous(),
            KeyCode::Right => self.field = self.field.next(),
            KeyCode::Char('a') if ctrl => {
                controller.add_group();
                self.row = controller.state().groups().len() - 1;
            }
            KeyCode::Char('d') if ctrl => {
                if let Some(id) = self.selected_group(controller.state()).map(|g| g.id) {
                    controller.remove_group(id);
                    self.row = self.row.min(controller.state().groups().len() - 1);
                }
            }
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.edit_keyword(controller, |value| value.push(c));
            }
            KeyCode::Backspace => {
                self.edit_keyword(controller, |value| {
                    value.pop();
                });
            }
            _ => {}
        }
    }

    fn edit_keyword(&self, controller: &mut SearchController, edit: impl FnOnce(&mut String)) {
        let Some(field) = self.field.keyword() else {
            return;
        };
        let Some(group) = self.selected_group(controller.state()) else {
            return;
        };
        let id = group.id;
        let mut value = group.keyword(field).to_string();
        edit(&mut value);
        controller.update_keyword(id, field, value);
    }

    fn selected_group<'a>(&self, state: &'a SearchState) -> Option<&'a KeywordGroup> {
        state.groups().get(self.row)
    }

    fn submit(&mut self, controller: &mut SearchController) {
        // Mirrors the disabled submit control.
        if !controller.state().can_submit() {
            return;
        }

        match controller.submit() {
            SubmitOutcome::Dispatched(_) => {
                self.awaiting_auto = true;
                self.status = Some("正在生成检索关键词...".to_string());
            }
            SubmitOutcome::Manual(groups) => {
                self.status = Some(format!(
                    "已提交 {} 组关键词：{}",
                    groups.len(),
                    query_expression(&groups)
                ));
            }
            SubmitOutcome::NoKeywords => {
                self.status = Some("请至少填写一个关键词".to_string());
            }
            SubmitOutcome::Busy | SubmitOutcome::BlankText => {}
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" ⌕ 案例检索 ")
            .border_style(Style::default().fg(Color::White));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mode = state.mode();
        let banner_height = if state.shows_instructions(mode) { 5 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),             // Mode selector
                Constraint::Length(banner_height), // Instructions
                Constraint::Min(3),                // Editor
                Constraint::Length(3),             // Submit + status
            ])
            .split(inner);

        render_mode_selector(frame, chunks[0], mode);
        if banner_height > 0 {
            render_instructions(frame, chunks[1], mode);
        }
        match mode {
            SearchMode::Auto => self.input.render(frame, chunks[2], state.is_searching()),
            SearchMode::Manual => self.render_groups(frame, chunks[2], state),
        }
        self.render_submit(frame, chunks[3], state);
    }

    fn render_groups(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let mut lines: Vec<Line> = state
            .groups()
            .iter()
            .enumerate()
            .map(|(i, group)| self.group_line(i, group, state.groups().len()))
            .collect();

        lines.push(Line::default());
        if state.groups().len() < MAX_GROUPS {
            lines.push(Line::from(Span::styled(
                "  ＋ 添加关键词组 (Ctrl+A)",
                Style::default().fg(Color::LightBlue),
            )));
        }
        let preview = query_expression(state.groups());
        if !preview.is_empty() {
            lines.push(Line::from(vec![
                Span::styled("  检索式：", Style::default().fg(Color::Gray)),
                Span::raw(preview),
            ]));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" 关键词组 (↑↓ 选择 │ Tab 切换 │ ←→ 关系 │ Ctrl+D 删除) ")
                .border_style(Style::default().fg(if state.is_searching() {
                    Color::DarkGray
                } else {
                    Color::LightBlue
                })),
        );
        frame.render_widget(paragraph, area);
    }

    fn group_line(&self, index: usize, group: &KeywordGroup, count: usize) -> Line<'static> {
        let selected = index == self.row;
        let cell = |field: ManualField, text: String, placeholder: &str| {
            let mut style = if text.is_empty() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            if selected && self.field == field {
                style = style.add_modifier(Modifier::REVERSED);
            }
            let shown = if text.is_empty() { placeholder.to_string() } else { text };
            Span::styled(format!("[{shown}]"), style)
        };

        let marker = if selected { "▶ " } else { "  " };
        let delete_style = if count <= MIN_GROUPS {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Red)
        };

        Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("第 {} 组 ", index + 1), Style::default().fg(Color::Gray)),
            cell(ManualField::Keyword1, group.keyword1.clone(), "关键词1"),
            Span::raw(" "),
            cell(ManualField::Relation, group.relation.label().to_string(), ""),
            Span::raw(" "),
            cell(ManualField::Keyword2, group.keyword2.clone(), "关键词2"),
            Span::styled(" ✕", delete_style),
        ])
    }

    fn render_submit(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let label = match state.mode() {
            SearchMode::Auto => "开始生成检索",
            SearchMode::Manual => "开始关键词检索",
        };
        let (button, button_style) = if state.is_searching() {
            (format!(" ⟳ {label}... "), Style::default().fg(Color::Yellow))
        } else if state.can_submit() {
            (
                format!(" {label} (Enter) "),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            (format!(" {label} "), Style::default().fg(Color::DarkGray))
        };

        let status = if state.is_searching() {
            "检索中...".to_string()
        } else {
            self.status.clone().unwrap_or_else(|| "就绪".to_string())
        };

        let lines = vec![
            Line::from(Span::styled(button, button_style)),
            Line::from(vec![
                Span::styled("状态: ", Style::default().fg(Color::Yellow)),
                Span::raw(status),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
    }
}

impl Default for SearchPanel {
    fn default() -> Self {
        Self::new()
    }
}

fn render_mode_selector(frame: &mut Frame, area: Rect, mode: SearchMode) {
    let tab = |m: SearchMode, icon: &str| {
        let style = if m == mode {
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightBlue)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        Span::styled(format!(" {icon} {} ", m.label()), style)
    };

    let line = Line::from(vec![
        tab(SearchMode::Auto, "✦"),
        Span::raw(" "),
        tab(SearchMode::Manual, "⚙"),
        Span::styled("  F2 切换", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(line, area);
}

fn render_instructions(frame: &mut Frame, area: Rect, mode: SearchMode) {
    let (title, body) = match mode {
        SearchMode::Auto => (
            "如何使用自动检索",
            "请在下方输入框中输入你的详细检索要求，例如案件特征，关键信息等。系统会根据你的输入自动生成检索关键词。",
        ),
        SearchMode::Manual => (
            "如何使用手动检索",
            "请在下方输入框中输入检索关键词，每组包含两个关键词和一个逻辑关系。可以添加或删除关键词组，最少1组，最多5组。关键词不能包含空格。",
        ),
    };

    let paragraph = Paragraph::new(body).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" ⓘ {title} (Esc 关闭) "))
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(paragraph, area);
}
