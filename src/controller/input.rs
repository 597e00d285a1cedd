//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::InputMode;
use crate::parser::PlaylistParser;
use crate::pipeline::MediaPipeline;

use super::AppController;

impl<P: MediaPipeline, R: PlaylistParser> AppController<P, R> {
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        // Handle error message first (blocks all other interactions)
        if self.ui.has_error() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.ui.clear_error();
            }
            return Ok(());
        }

        // Handle help popup
        if self.ui.show_help_popup {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
                self.ui.show_help_popup = false;
            }
            return Ok(());
        }

        // Handle path input while the open prompt is up
        if self.ui.input_mode == InputMode::OpenPrompt {
            match key.code {
                KeyCode::Enter => {
                    let path = self.ui.close_prompt();
                    self.open_path(&path);
                }
                KeyCode::Esc => {
                    self.ui.close_prompt();
                }
                KeyCode::Backspace => {
                    self.ui.open_input.pop();
                }
                KeyCode::Tab => {
                    self.test_path();
                }
                KeyCode::Char(c) => {
                    // Q still quits from the prompt when Ctrl is pressed
                    if (c == 'q' || c == 'Q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        self.ui.should_quit = true;
                        return Ok(());
                    }
                    self.ui.open_input.push(c);
                }
                _ => {}
            }
            return Ok(());
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.ui.should_quit = true;
            }
            KeyCode::Char('o') | KeyCode::Char('O') => {
                self.ui.open_prompt();
            }
            // Play from the start
            KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Enter => {
                self.play();
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.next();
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.stop();
            }
            // Classify the active path
            KeyCode::Char('t') | KeyCode::Char('T') => {
                self.test_path();
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                self.ui.show_help_popup = true;
            }
            _ => {}
        }
        Ok(())
    }
}
