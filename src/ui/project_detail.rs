use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use uuid::Uuid;

use crate::ledger::{access, status::invoice_label, Folder, FolderStatus};
use crate::models::SessionUser;
use crate::ui::{
    components::popup::{message_line, render_confirmation},
    money, paid_style, step_selection,
};

// Invoices of one project folder
pub struct ProjectDetailState {
    folder_id: Uuid,
    table_state: TableState,
    show_delete_confirmation: bool,
    pub message: Option<String>,
}

impl ProjectDetailState {
    pub fn new(folder_id: Uuid) -> Self {
        let mut table_state = TableState::default();
        table_state.select(Some(0));
        Self {
            folder_id,
            table_state,
            show_delete_confirmation: false,
            message: None,
        }
    }

    pub fn folder_id(&self) -> Uuid {
        self.folder_id
    }

    /// Put the cursor on a given invoice, if it is in this folder.
    pub fn select_invoice(&mut self, folder: &Folder, invoice_id: Uuid) {
        if let Some(i) = folder.invoices.iter().position(|i| i.id == invoice_id) {
            self.table_state.select(Some(i));
        }
    }

    fn selected(&self, folder: &Folder) -> Option<Uuid> {
        self.table_state
            .selected()
            .and_then(|i| folder.invoices.get(i))
            .map(|invoice| invoice.id)
    }
}

pub enum ProjectDetailAction {
    Back,
    NewInvoice(Uuid),
    EditInvoice(Uuid),
    DeleteInvoice(Uuid),
    TogglePaid(Uuid),
    MarkSeen(Uuid),
    OpenFiles(Uuid),
}

pub fn render_project_detail<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    state: &mut ProjectDetailState,
    user: &SessionUser,
    folder: &Folder,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(4),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    let mut header = format!(
        "{}  |  {}  |  owner: {}",
        folder.name,
        FolderStatus::of(&folder.invoices).label(),
        folder.owner_email
    );
    if !folder.is_active {
        header.push_str("  |  inactive: no new invoices");
    }
    let title = Paragraph::new(header)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    if state.table_state.selected().map_or(true, |i| i >= folder.invoices.len()) {
        state.table_state.select(if folder.invoices.is_empty() { None } else { Some(0) });
    }

    let rows: Vec<Row> = folder
        .invoices
        .iter()
        .map(|invoice| {
            let expected = invoice
                .expected_payment_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "—".to_string());
            let paid_on = invoice
                .paid_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            let mut status = vec![Span::styled(invoice_label(invoice), paid_style(invoice.paid))];
            if user.is_admin() && !invoice.seen_by_admin {
                status.push(Span::styled(" new", Style::default().fg(Color::LightRed)));
            }
            Row::new(vec![
                Cell::from(invoice.date.format("%Y-%m-%d").to_string()),
                Cell::from(money(invoice.amount)),
                Cell::from(expected),
                Cell::from(Spans::from(status)),
                Cell::from(paid_on),
                Cell::from(invoice.file_count().to_string()),
                Cell::from(invoice.created_by_email.clone()),
            ])
        })
        .collect();

    let table = Table::new(rows)
        .header(
            Row::new(vec!["Date", "Amount", "Expected", "Status", "Paid on", "Files", "Created by"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().title("Invoices").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .widths(&[
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(6),
            Constraint::Min(10),
        ]);
    frame.render_stateful_widget(table, chunks[1], &mut state.table_state);

    frame.render_widget(message_line(&state.message), chunks[2]);

    let mut buttons = vec!["<n> New invoice", "<e> Edit", "<d> Delete", "<f> Files"];
    if user.is_admin() {
        buttons.push("<p> Toggle paid");
        buttons.push("<s> Mark seen");
    }
    buttons.push("<Esc> Back");
    let buttons = Paragraph::new(buttons.join(" | "))
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[3]);

    if state.show_delete_confirmation {
        render_confirmation(
            frame,
            "Are you sure you want to delete this invoice?",
            "Its attachments will no longer be listed.",
        );
    }
}

pub fn handle_input(
    state: &mut ProjectDetailState,
    user: &SessionUser,
    folder: &Folder,
) -> Result<Option<ProjectDetailAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code, user, folder));
    }
    Ok(None)
}

/// Disallowed actions are answered with an inline message instead of an
/// action, so the backend never sees them.
pub fn handle_key(
    state: &mut ProjectDetailState,
    key: KeyCode,
    user: &SessionUser,
    folder: &Folder,
) -> Option<ProjectDetailAction> {
    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') => {
                state.show_delete_confirmation = false;
                return state.selected(folder).map(ProjectDetailAction::DeleteInvoice);
            }
            KeyCode::Char('n') | KeyCode::Esc => state.show_delete_confirmation = false,
            _ => {}
        }
        return None;
    }

    state.message = None;
    let selected = state.selected(folder).and_then(|id| folder.invoice(id));

    match key {
        KeyCode::Esc | KeyCode::Char('q') => return Some(ProjectDetailAction::Back),
        KeyCode::Down => state
            .table_state
            .select(step_selection(state.table_state.selected(), folder.invoices.len(), true)),
        KeyCode::Up => state
            .table_state
            .select(step_selection(state.table_state.selected(), folder.invoices.len(), false)),
        KeyCode::Char('n') => {
            if access::can_add_invoice(user, folder) {
                return Some(ProjectDetailAction::NewInvoice(folder.id));
            }
            state.message = Some("This project is inactive.".to_string());
        }
        KeyCode::Char('e') => match selected {
            Some(invoice) if access::can_edit_invoice(user, invoice) => {
                return Some(ProjectDetailAction::EditInvoice(invoice.id));
            }
            Some(_) => state.message = Some("This invoice can no longer be edited.".to_string()),
            None => {}
        },
        KeyCode::Char('d') => match selected {
            Some(invoice) if access::can_delete_invoice(user, invoice) => {
                state.show_delete_confirmation = true;
            }
            Some(_) => state.message = Some("This invoice can no longer be deleted.".to_string()),
            None => {}
        },
        KeyCode::Char('p') if access::can_toggle_paid(user) => {
            return selected.map(|invoice| ProjectDetailAction::TogglePaid(invoice.id));
        }
        KeyCode::Char('s') if access::can_mark_seen(user) => {
            return selected
                .filter(|invoice| !invoice.seen_by_admin)
                .map(|invoice| ProjectDetailAction::MarkSeen(invoice.id));
        }
        KeyCode::Char('f') | KeyCode::Enter => {
            return selected.map(|invoice| ProjectDetailAction::OpenFiles(invoice.id));
        }
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::folders::fixtures::{user, view};
    use crate::models::Role;

    fn folder(active: bool) -> Folder {
        let mut open = view(100.0, false);
        open.created_by_email = "crew@example.com".to_string();
        let mut settled = view(50.0, true);
        settled.created_by_email = "crew@example.com".to_string();
        Folder {
            id: Uuid::new_v4(),
            name: "Main St".to_string(),
            owner_email: "admin".to_string(),
            is_active: active,
            invoices: vec![open, settled],
            payroll: Vec::new(),
        }
    }

    #[test]
    fn paid_invoices_are_locked_for_everyone() {
        let admin = user(Role::Admin);
        let folder = folder(true);
        let mut state = ProjectDetailState::new(folder.id);

        handle_key(&mut state, KeyCode::Down, &admin, &folder);
        assert!(handle_key(&mut state, KeyCode::Char('e'), &admin, &folder).is_none());
        assert!(state.message.is_some());
        assert!(handle_key(&mut state, KeyCode::Char('d'), &admin, &folder).is_none());
        assert!(!state.show_delete_confirmation);

        assert!(matches!(
            handle_key(&mut state, KeyCode::Char('p'), &admin, &folder),
            Some(ProjectDetailAction::TogglePaid(id)) if id == folder.invoices[1].id
        ));
    }

    #[test]
    fn creator_can_edit_and_delete_unpaid() {
        let crew = user(Role::Regular);
        let folder = folder(true);
        let mut state = ProjectDetailState::new(folder.id);

        assert!(matches!(
            handle_key(&mut state, KeyCode::Char('e'), &crew, &folder),
            Some(ProjectDetailAction::EditInvoice(id)) if id == folder.invoices[0].id
        ));
        handle_key(&mut state, KeyCode::Char('d'), &crew, &folder);
        assert!(state.show_delete_confirmation);
        assert!(matches!(
            handle_key(&mut state, KeyCode::Char('y'), &crew, &folder),
            Some(ProjectDetailAction::DeleteInvoice(_))
        ));
        assert!(handle_key(&mut state, KeyCode::Char('p'), &crew, &folder).is_none());
    }

    #[test]
    fn inactive_folder_refuses_new_invoices() {
        let crew = user(Role::Regular);
        let folder = folder(false);
        let mut state = ProjectDetailState::new(folder.id);

        assert!(handle_key(&mut state, KeyCode::Char('n'), &crew, &folder).is_none());
        assert_eq!(state.message.as_deref(), Some("This project is inactive."));
    }
}
