//! Integration tests for the TUI shell: responsive header, keys, rendering

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fabao::api::ApiClient;
use fabao::event::Event;
use fabao::search::{KeywordField, Relation, SearchMode};
use fabao::tui::{App, Page};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use std::sync::Arc;

fn app(width: u16) -> App {
    // Nothing here submits an auto search, so the backend is never reached.
    App::new(Arc::new(ApiClient::new("http://127.0.0.1:9/api")), width)
}

fn key(app: &mut App, code: KeyCode) {
    app.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
        .unwrap();
}

fn key_with(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    app.handle_event(Event::Key(KeyEvent::new(code, modifiers)))
        .unwrap();
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        key(app, KeyCode::Char(c));
    }
}

/// Render and return the first `rows` lines of the screen as plain text
fn screen(app: &mut App, width: u16, height: u16, rows: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|frame| app.render(frame)).unwrap();

    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..rows.min(height) {
        for x in 0..width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

#[test]
fn wide_terminal_shows_inline_navigation() {
    let mut app = app(120);
    assert!(app.is_wide());

    let header = screen(&mut app, 120, 30, 1);
    assert!(header.contains("Alt+1"));
    assert!(!header.contains("Ctrl+O"));
}

#[test]
fn narrow_terminal_collapses_navigation() {
    let mut app = app(80);
    assert!(!app.is_wide());

    let header = screen(&mut app, 80, 30, 1);
    assert!(header.contains("Ctrl+O"));
    assert!(!header.contains("Alt+1"));
}

#[test]
fn resize_switches_layout_without_rebuilding() {
    let mut app = app(120);
    assert!(app.is_wide());

    app.handle_event(Event::Resize(80, 30)).unwrap();
    assert!(!app.is_wide());

    app.handle_event(Event::Resize(100, 30)).unwrap();
    assert!(app.is_wide());
}

#[test]
fn sidebar_navigates_between_pages() {
    let mut app = app(80);
    key_with(&mut app, KeyCode::Char('o'), KeyModifiers::CONTROL);
    assert!(app.header().sidebar_open());

    key(&mut app, KeyCode::Down);
    key(&mut app, KeyCode::Enter);

    assert!(!app.header().sidebar_open());
    assert_eq!(app.page(), Page::Search);
}

#[test]
fn sidebar_stays_closed_when_wide() {
    let mut app = app(120);
    key_with(&mut app, KeyCode::Char('o'), KeyModifiers::CONTROL);
    assert!(!app.header().sidebar_open());

    key_with(&mut app, KeyCode::Char('3'), KeyModifiers::ALT);
    assert_eq!(app.page(), Page::Archive);
}

#[test]
fn f2_toggles_mode_and_esc_dismisses_banner() {
    let mut app = app(120);
    key(&mut app, KeyCode::F(2));
    assert_eq!(app.controller().state().mode(), SearchMode::Manual);

    key(&mut app, KeyCode::Esc);
    key(&mut app, KeyCode::Esc);
    let state = app.controller().state();
    assert!(!state.shows_instructions(SearchMode::Manual));
    assert!(state.shows_instructions(SearchMode::Auto));

    key(&mut app, KeyCode::F(2));
    assert_eq!(app.controller().state().mode(), SearchMode::Auto);
}

#[test]
fn manual_editor_strips_spaces_and_manages_groups() {
    let mut app = app(120);
    key(&mut app, KeyCode::F(2));

    type_text(&mut app, "伪 造");
    key(&mut app, KeyCode::Tab);
    key(&mut app, KeyCode::Right);
    key(&mut app, KeyCode::Tab);
    type_text(&mut app, "私刻");

    let group = &app.controller().state().groups()[0];
    assert_eq!(group.keyword(KeywordField::Keyword1), "伪造");
    assert_eq!(group.keyword(KeywordField::Keyword2), "私刻");
    assert_eq!(group.relation, Relation::Or);

    for _ in 0..6 {
        key_with(&mut app, KeyCode::Char('a'), KeyModifiers::CONTROL);
    }
    assert_eq!(app.controller().state().groups().len(), 5);

    for _ in 0..6 {
        key_with(&mut app, KeyCode::Char('d'), KeyModifiers::CONTROL);
    }
    assert_eq!(app.controller().state().groups().len(), 1);
}

#[test]
fn manual_submit_reports_expression() {
    let mut app = app(120);
    key(&mut app, KeyCode::F(2));
    type_text(&mut app, "theft");
    key(&mut app, KeyCode::Enter);

    assert!(!app.controller().state().is_searching());
    let text = screen(&mut app, 120, 30, 30);
    assert!(text.contains("theft"));
}

#[test]
fn blank_auto_submit_is_blocked_by_the_form() {
    let mut app = app(120);
    key(&mut app, KeyCode::Enter);
    assert!(!app.controller().state().is_searching());
}

#[test]
fn ctrl_c_quits() {
    let mut app = app(120);
    key_with(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert!(app.should_quit());
}
