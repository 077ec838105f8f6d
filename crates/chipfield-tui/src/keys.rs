use crossterm::event::{KeyCode, KeyModifiers};

use crate::app::{App, Focus};

/// Route a key press to the field.
pub fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if modifiers.contains(KeyModifiers::CONTROL) {
        match code {
            KeyCode::Char('c') => app.cancel(),
            KeyCode::Char('l') => app.clear_chips(),
            KeyCode::Char('s') => app.submit(),
            _ => {}
        }
        return;
    }

    match app.focus {
        Focus::Input => handle_input_key(app, code),
        Focus::Chip(_) => handle_chip_key(app, code),
    }
}

fn handle_input_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => {
            if app.dropdown.active {
                app.dropdown.clear();
            } else {
                app.cancel();
            }
        }
        KeyCode::Up | KeyCode::BackTab => app.dropdown.move_up(),
        KeyCode::Down => app.dropdown.move_down(),
        KeyCode::Tab => {
            if app.dropdown.active {
                app.dropdown.move_down();
            } else {
                app.refresh_suggestions();
            }
        }
        KeyCode::Enter => {
            if app.dropdown.active {
                app.accept_selected();
            } else if app.query().is_empty() {
                app.submit();
            }
        }
        KeyCode::Backspace => {
            if app.query().is_empty() {
                app.focus_last_chip();
            } else {
                app.delete_back();
            }
        }
        KeyCode::Left => {
            if app.cursor == 0 {
                app.focus_last_chip();
            } else {
                app.cursor_left();
            }
        }
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

fn handle_chip_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.focus = Focus::Input,
        KeyCode::Left | KeyCode::Char('h') => app.chip_left(),
        KeyCode::Right | KeyCode::Char('l') => app.chip_right(),
        KeyCode::Backspace | KeyCode::Delete | KeyCode::Char('x') => app.remove_focused_chip(),
        KeyCode::Enter => app.submit(),
        // Any other printable key goes back to typing.
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Outcome;
    use chipfield_core::{ChipfieldConfig, LocalLookup, Suggestion};

    fn create_mock_app() -> App {
        let people = vec![
            Suggestion::new("1", "Alice"),
            Suggestion::new("2", "Bob"),
            Suggestion::new("3", "Carol"),
        ];
        App::new(&ChipfieldConfig::default(), LocalLookup::new(people), &[]).unwrap()
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            handle_key(app, KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, code, KeyModifiers::NONE);
    }

    #[test]
    fn test_type_and_accept_builds_data() {
        let mut app = create_mock_app();

        type_str(&mut app, "ali");
        assert!(app.dropdown.active);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.data(), "1");
        assert_eq!(app.query(), "");
        assert_eq!(app.cursor, 0);

        type_str(&mut app, "bob");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.data(), "1,2");
        assert_eq!(app.status_message, "Added Bob");
    }

    #[test]
    fn test_backspace_twice_removes_last_chip() {
        let mut app = create_mock_app();
        type_str(&mut app, "ali");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "car");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.data(), "1,3");

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.focus, Focus::Chip(1));
        assert_eq!(app.data(), "1,3");

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.data(), "1");
        assert_eq!(app.focus, Focus::Chip(0));
    }

    #[test]
    fn test_chip_navigation_and_delete() {
        let mut app = create_mock_app();
        for name in ["ali", "bob", "car"] {
            type_str(&mut app, name);
            press(&mut app, KeyCode::Enter);
        }

        press(&mut app, KeyCode::Left);
        assert_eq!(app.focus, Focus::Chip(2));
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.focus, Focus::Chip(0));

        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.data(), "2,3");

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.focus, Focus::Input);
    }

    #[test]
    fn test_arrow_selection_picks_second_hit() {
        let mut app = create_mock_app();
        type_str(&mut app, "o");
        let second = app.dropdown.items.get(1).map(|r| r.data.id.clone()).unwrap();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.data(), second);
    }

    #[test]
    fn test_ctrl_l_clears() {
        let mut app = create_mock_app();
        type_str(&mut app, "ali");
        press(&mut app, KeyCode::Enter);
        handle_key(&mut app, KeyCode::Char('l'), KeyModifiers::CONTROL);
        assert_eq!(app.data(), "");
    }

    #[test]
    fn test_enter_on_empty_input_submits() {
        let mut app = create_mock_app();
        type_str(&mut app, "bob");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert!(app.should_quit);
        assert_eq!(app.outcome, Some(Outcome::Submitted("2".to_string())));
    }

    #[test]
    fn test_esc_closes_dropdown_then_cancels() {
        let mut app = create_mock_app();
        type_str(&mut app, "a");
        press(&mut app, KeyCode::Esc);
        assert!(!app.dropdown.active);
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.outcome, Some(Outcome::Cancelled));
    }
}
