use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::components::{popup::{centered_rect, message_line}, text_input::edit_text};

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum LoginField {
    Email,
    Password,
}

pub struct LoginState {
    pub email: String,
    pub password: String,
    pub field: LoginField,
    pub message: Option<String>,
}

impl LoginState {
    pub fn new(email: Option<String>) -> Self {
        let field = if email.is_some() { LoginField::Password } else { LoginField::Email };
        Self {
            email: email.unwrap_or_default(),
            password: String::new(),
            field,
            message: None,
        }
    }

    fn switch_field(&mut self) {
        self.field = match self.field {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }
}

pub enum LoginAction {
    Submit { email: String, password: String },
    Quit,
}

pub fn render_login<B: Backend>(frame: &mut Frame<B>, state: &LoginState) {
    let area = centered_rect(60, 60, frame.size());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(1),
            ]
            .as_ref(),
        )
        .split(area);

    let title = Paragraph::new(Spans::from(vec![Span::styled(
        "DC Cable LLC - Sign in",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let field_style = |field: LoginField| {
        if state.field == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        }
    };

    let email = Paragraph::new(state.email.as_str())
        .block(Block::default().title("Email").borders(Borders::ALL).border_style(field_style(LoginField::Email)));
    frame.render_widget(email, chunks[1]);

    let masked = "*".repeat(state.password.chars().count());
    let password = Paragraph::new(masked)
        .block(Block::default().title("Password").borders(Borders::ALL).border_style(field_style(LoginField::Password)));
    frame.render_widget(password, chunks[2]);

    frame.render_widget(message_line(&state.message), chunks[3]);

    let help = Paragraph::new("Tab - Switch field | Enter - Sign in | Esc - Quit")
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(help, chunks[4]);
}

pub fn handle_input(state: &mut LoginState) -> Result<Option<LoginAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

pub fn handle_key(state: &mut LoginState, key: KeyCode) -> Option<LoginAction> {
    match key {
        KeyCode::Esc => return Some(LoginAction::Quit),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => state.switch_field(),
        KeyCode::Enter => {
            if state.field == LoginField::Email && state.password.is_empty() {
                state.switch_field();
                return None;
            }
            state.message = None;
            return Some(LoginAction::Submit {
                email: state.email.clone(),
                password: state.password.clone(),
            });
        }
        other => {
            let buffer = match state.field {
                LoginField::Email => &mut state.email,
                LoginField::Password => &mut state.password,
            };
            edit_text(buffer, other);
        }
    }
    None
}
