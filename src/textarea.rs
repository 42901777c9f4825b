use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::{Color, Style};
use tui_textarea::{Input, Key, TextArea};

/// Single-line text box with a dimmed placeholder.
pub fn single_line(placeholder: &str) -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_placeholder_text(placeholder.to_string());
    textarea.set_placeholder_style(Style::default().fg(Color::DarkGray));
    textarea.set_cursor_line_style(Style::default());
    textarea
}

pub fn textarea_text(textarea: &TextArea) -> String {
    textarea.lines().join("\n")
}

/// Feeds `key` to `textarea`, dropping line breaks. Returns whether the
/// text changed.
pub fn edit_single_line(textarea: &mut TextArea, key: KeyEvent) -> bool {
    let input = textarea_input_from_key(key);
    if matches!(input.key, Key::Enter | Key::Null) {
        return false;
    }
    if input.key == Key::Char('m') && input.ctrl {
        return false;
    }
    textarea.input(input)
}

pub fn textarea_input_from_key(key: KeyEvent) -> Input {
    let key_code = match key.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Enter => Key::Enter,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Delete => Key::Delete,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Esc => Key::Esc,
        _ => Key::Null,
    };

    Input {
        key: key_code,
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        alt: key.modifiers.contains(KeyModifiers::ALT),
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
    }
}
