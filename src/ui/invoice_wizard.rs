use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use uuid::Uuid;

use crate::ledger::InvoiceView;
use crate::models::InvoiceChanges;
use crate::ui::components::{
    date_input::DateInputState,
    popup::message_line,
    text_input::{edit_amount, edit_text, parse_amount},
};

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum InvoiceField {
    Amount,
    Date,
    ExpectedDate,
    Attachment,
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum Mode {
    New { folder_id: Uuid },
    Edit { invoice_id: Uuid, original_date: NaiveDate },
}

pub struct InvoiceWizardState {
    mode: Mode,
    current_field: InvoiceField,
    editing: bool,
    amount: String,
    date_state: DateInputState,
    expected_state: DateInputState,
    attachment: String,
    pub message: Option<String>,
}

impl InvoiceWizardState {
    pub fn new(folder_id: Uuid, today: NaiveDate) -> Self {
        Self {
            mode: Mode::New { folder_id },
            current_field: InvoiceField::Amount,
            editing: false,
            amount: String::new(),
            date_state: DateInputState::new(Some(today), today),
            expected_state: DateInputState::new(None, today),
            attachment: String::new(),
            message: None,
        }
    }

    pub fn edit(invoice: &InvoiceView, today: NaiveDate) -> Self {
        Self {
            mode: Mode::Edit {
                invoice_id: invoice.id,
                original_date: invoice.date,
            },
            current_field: InvoiceField::Amount,
            editing: false,
            amount: invoice.amount.to_string(),
            date_state: DateInputState::new(Some(invoice.date), today),
            expected_state: DateInputState::new(invoice.expected_payment_date, today),
            attachment: String::new(),
            message: None,
        }
    }

    fn fields(&self) -> &'static [InvoiceField] {
        match self.mode {
            Mode::New { .. } => &[InvoiceField::Amount, InvoiceField::ExpectedDate, InvoiceField::Attachment],
            Mode::Edit { .. } => &[InvoiceField::Amount, InvoiceField::Date, InvoiceField::ExpectedDate],
        }
    }

    fn move_field(&mut self, forward: bool) {
        let fields = self.fields();
        let i = fields.iter().position(|f| *f == self.current_field).unwrap_or(0);
        let next = if forward {
            (i + 1) % fields.len()
        } else {
            (i + fields.len() - 1) % fields.len()
        };
        self.current_field = fields[next];
    }

    fn date_input(&mut self) -> Option<&mut DateInputState> {
        match self.current_field {
            InvoiceField::Date => Some(&mut self.date_state),
            InvoiceField::ExpectedDate => Some(&mut self.expected_state),
            _ => None,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if let Some(input) = self.date_input() {
            input.toggle_editing();
        }
    }

    fn edit_current_field(&mut self, key: KeyCode) {
        match self.current_field {
            InvoiceField::Amount => {
                edit_amount(&mut self.amount, key);
            }
            InvoiceField::Attachment => {
                edit_text(&mut self.attachment, key);
            }
            InvoiceField::Date | InvoiceField::ExpectedDate => {
                if let Some(input) = self.date_input() {
                    input.handle_input(key);
                }
            }
        }
    }

    fn to_action(&self) -> Result<InvoiceWizardAction, &'static str> {
        let amount = parse_amount(&self.amount);
        match self.mode {
            Mode::New { folder_id } => {
                let amount = amount.filter(|a| *a > 0.0).ok_or("Enter an amount greater than zero.")?;
                let attachment = self.attachment.trim();
                Ok(InvoiceWizardAction::Create {
                    folder_id,
                    amount,
                    expected_payment_date: self.expected_state.date,
                    attachment: (!attachment.is_empty()).then(|| PathBuf::from(attachment)),
                })
            }
            Mode::Edit { invoice_id, original_date } => {
                let amount = amount.ok_or("Enter a valid amount.")?;
                Ok(InvoiceWizardAction::Update {
                    invoice_id,
                    changes: InvoiceChanges {
                        amount: Some(amount),
                        date: Some(self.date_state.date.unwrap_or(original_date)),
                        expected_payment_date: Some(self.expected_state.date),
                    },
                })
            }
        }
    }
}

pub enum InvoiceWizardAction {
    Cancel,
    Create {
        folder_id: Uuid,
        amount: f64,
        expected_payment_date: Option<NaiveDate>,
        attachment: Option<PathBuf>,
    },
    Update {
        invoice_id: Uuid,
        changes: InvoiceChanges,
    },
}

pub fn render_invoice_wizard<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &InvoiceWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3), // Title
                Constraint::Length(9), // Form
                Constraint::Length(1), // Message
                Constraint::Length(3), // Help
            ]
            .as_ref(),
        )
        .split(area);

    let title_text = match state.mode {
        Mode::New { .. } => "New Invoice",
        Mode::Edit { .. } => "Edit Invoice",
    };
    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    render_form(frame, state, chunks[1]);

    frame.render_widget(message_line(&state.message), chunks[2]);

    let help_text = match (state.editing, state.current_field) {
        (false, _) => "Enter - Edit field | Up/Down - Navigate fields | S - Save invoice | Esc - Cancel",
        (true, InvoiceField::Date | InvoiceField::ExpectedDate) => {
            "Enter - Done | Left/Right - Switch date part | Delete - Clear date"
        }
        (true, InvoiceField::Attachment) => "Type a file path | Enter - Done",
        (true, InvoiceField::Amount) => "Enter - Done",
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[3]);
}

fn render_form<B: Backend>(frame: &mut Frame<B>, state: &InvoiceWizardState, area: Rect) {
    let fields = state.fields();
    let form_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Length(3)].as_ref())
        .split(area);

    for (field, chunk) in fields.iter().zip(form_chunks.iter()) {
        let style = if *field == state.current_field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let (label, value) = match field {
            InvoiceField::Amount => {
                let cursor = if state.editing && *field == state.current_field { "_" } else { "" };
                ("Amount: ", format!("{}{cursor}", state.amount))
            }
            InvoiceField::Date => ("Date: ", state.date_state.get_display_string()),
            InvoiceField::ExpectedDate => ("Expected payment: ", state.expected_state.get_display_string()),
            InvoiceField::Attachment => {
                let value = if state.attachment.is_empty() && !state.editing {
                    "(none)".to_string()
                } else {
                    state.attachment.clone()
                };
                ("Attachment: ", value)
            }
        };
        let paragraph = Paragraph::new(Spans::from(vec![Span::styled(label, style), Span::raw(value)]))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(paragraph, *chunk);
    }
}

pub fn handle_input(state: &mut InvoiceWizardState) -> Result<Option<InvoiceWizardAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

pub fn handle_key(state: &mut InvoiceWizardState, key: KeyCode) -> Option<InvoiceWizardAction> {
    state.message = None;

    if state.editing {
        match key {
            KeyCode::Enter | KeyCode::Esc => state.toggle_editing(),
            other => state.edit_current_field(other),
        }
        return None;
    }

    match key {
        KeyCode::Esc => return Some(InvoiceWizardAction::Cancel),
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Up => state.move_field(false),
        KeyCode::Down | KeyCode::Tab => state.move_field(true),
        KeyCode::Char('s') => match state.to_action() {
            Ok(action) => return Some(action),
            Err(message) => state.message = Some(message.to_string()),
        },
        _ => {}
    }
    None
}
