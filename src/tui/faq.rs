use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

/// Question and answer pairs shown in the FAQ panel
pub const FAQ_ENTRIES: &[(&str, &str)] = &[
    (
        "自动检索和手动检索有什么区别？",
        "自动检索根据你的案情描述生成检索关键词组；手动检索由你直接填写关键词组。",
    ),
    (
        "关键词组之间是什么关系？",
        "组内两个关键词按所选的“并且/或者”连接，不同的组之间均为“并且”关系。",
    ),
    (
        "最多可以添加几组关键词？",
        "最少 1 组，最多 5 组。关键词中的空白字符会被自动去除。",
    ),
    (
        "生成的关键词可以修改吗？",
        "可以。自动检索完成后切换到手动检索，即可在生成的关键词组上继续编辑。",
    ),
];

pub fn render_faq(frame: &mut Frame, area: Rect) {
    let mut lines = Vec::with_capacity(FAQ_ENTRIES.len() * 3);
    for (question, answer) in FAQ_ENTRIES {
        lines.push(Line::from(Span::styled(
            format!("Q: {question}"),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!("A: {answer}")));
        lines.push(Line::default());
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" ⓘ 常见问题 ")
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(paragraph, area);
}
