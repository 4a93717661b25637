use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use uuid::Uuid;

use crate::ledger::{access, InvoiceView};
use crate::models::SessionUser;
use crate::ui::{
    components::{
        popup::{message_line, render_confirmation},
        text_input::edit_text,
    },
    money, step_selection,
};

/// A row of the attachment list: the single legacy image comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Legacy,
    File(Uuid),
}

fn entries(invoice: &InvoiceView) -> Vec<Entry> {
    invoice
        .legacy_image
        .iter()
        .map(|_| Entry::Legacy)
        .chain(invoice.files.iter().map(|f| Entry::File(f.id)))
        .collect()
}

pub struct AttachmentsState {
    invoice_id: Uuid,
    folder_id: Uuid,
    list_state: ListState,
    new_path: Option<String>,
    show_delete_confirmation: bool,
    pub message: Option<String>,
}

impl AttachmentsState {
    pub fn new(folder_id: Uuid, invoice_id: Uuid) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            invoice_id,
            folder_id,
            list_state,
            new_path: None,
            show_delete_confirmation: false,
            message: None,
        }
    }

    pub fn folder_id(&self) -> Uuid {
        self.folder_id
    }

    pub fn invoice_id(&self) -> Uuid {
        self.invoice_id
    }

    fn selected(&self, invoice: &InvoiceView) -> Option<Entry> {
        self.list_state
            .selected()
            .and_then(|i| entries(invoice).get(i).copied())
    }
}

pub enum AttachmentAction {
    Back,
    Add { invoice_id: Uuid, path: PathBuf },
    DeleteFile(Uuid),
    DeleteLegacy(Uuid),
}

pub fn render_attachments<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    state: &mut AttachmentsState,
    user: &SessionUser,
    invoice: &InvoiceView,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    let title = Paragraph::new(format!(
        "Files for invoice of {} dated {}",
        money(invoice.amount),
        invoice.date.format("%Y-%m-%d")
    ))
    .style(Style::default().fg(Color::Cyan))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let count = entries(invoice).len();
    if state.list_state.selected().map_or(true, |i| i >= count) {
        state.list_state.select(if count == 0 { None } else { Some(0) });
    }

    let legacy = invoice.legacy_image.iter().map(|image| {
        ListItem::new(Spans::from(vec![
            Span::raw(image.name.clone()),
            Span::styled("  (original upload)  ", Style::default().fg(Color::Gray)),
            Span::styled(image.url.clone(), Style::default().fg(Color::Blue)),
        ]))
    });
    let files = invoice.files.iter().map(|file| {
        ListItem::new(Spans::from(vec![
            Span::raw(file.name.clone()),
            Span::raw("  "),
            Span::styled(file.url.clone(), Style::default().fg(Color::Blue)),
        ]))
    });
    let items: Vec<ListItem> = legacy.chain(files).collect();

    let list = List::new(items)
        .block(Block::default().title(format!("Files ({})", invoice.file_count())).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(list, chunks[1], &mut state.list_state);

    let input = match &state.new_path {
        Some(path) => Paragraph::new(format!("{path}_"))
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().title("File path (Enter to upload, Esc to cancel)").borders(Borders::ALL)),
        None => Paragraph::new("").block(Block::default().borders(Borders::ALL)),
    };
    frame.render_widget(input, chunks[2]);

    frame.render_widget(message_line(&state.message), chunks[3]);

    let buttons_text = if access::can_edit_invoice(user, invoice) {
        "<a> Add file | <d> Delete file | <Esc> Back"
    } else {
        "<Esc> Back"
    };
    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[4]);

    if state.show_delete_confirmation {
        render_confirmation(frame, "Remove this file?", "The stored copy is deleted too.");
    }
}

pub fn handle_input(
    state: &mut AttachmentsState,
    user: &SessionUser,
    invoice: &InvoiceView,
) -> Result<Option<AttachmentAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code, user, invoice));
    }
    Ok(None)
}

pub fn handle_key(
    state: &mut AttachmentsState,
    key: KeyCode,
    user: &SessionUser,
    invoice: &InvoiceView,
) -> Option<AttachmentAction> {
    if let Some(path) = &mut state.new_path {
        match key {
            KeyCode::Esc => state.new_path = None,
            KeyCode::Enter => {
                let path = path.trim().to_string();
                state.new_path = None;
                if !path.is_empty() {
                    return Some(AttachmentAction::Add {
                        invoice_id: invoice.id,
                        path: PathBuf::from(path),
                    });
                }
            }
            other => {
                edit_text(path, other);
            }
        }
        return None;
    }

    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') => {
                state.show_delete_confirmation = false;
                return match state.selected(invoice) {
                    Some(Entry::Legacy) => Some(AttachmentAction::DeleteLegacy(invoice.id)),
                    Some(Entry::File(id)) => Some(AttachmentAction::DeleteFile(id)),
                    None => None,
                };
            }
            KeyCode::Char('n') | KeyCode::Esc => state.show_delete_confirmation = false,
            _ => {}
        }
        return None;
    }

    state.message = None;
    let count = entries(invoice).len();
    match key {
        KeyCode::Esc | KeyCode::Char('q') => return Some(AttachmentAction::Back),
        KeyCode::Down => state.list_state.select(step_selection(state.list_state.selected(), count, true)),
        KeyCode::Up => state.list_state.select(step_selection(state.list_state.selected(), count, false)),
        KeyCode::Char('a') | KeyCode::Char('d') if !access::can_edit_invoice(user, invoice) => {
            state.message = Some("Files of this invoice can no longer be changed.".to_string());
        }
        KeyCode::Char('a') => state.new_path = Some(String::new()),
        KeyCode::Char('d') => {
            if state.selected(invoice).is_some() {
                state.show_delete_confirmation = true;
            }
        }
        _ => {}
    }
    None
}
