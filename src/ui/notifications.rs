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

use crate::ledger::{Notifications, ScopedInvoice};
use crate::models::Role;
use crate::ui::{components::popup::message_line, money, nav_for_key, step_selection, NavAction};

pub struct NotificationsState {
    list_state: ListState,
    pub message: Option<String>,
}

impl NotificationsState {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self { list_state, message: None }
    }
}

/// Opening a notification jumps to the invoice's folder; unseen ones are
/// marked seen on the way.
pub enum NotificationAction {
    Open { folder_id: Uuid, invoice_id: Uuid, unseen: bool },
    Nav(NavAction),
}

/// Unseen invoices first, then those expected today.
fn rows(notifications: &Notifications) -> Vec<(bool, &ScopedInvoice)> {
    notifications
        .unseen
        .iter()
        .map(|s| (true, s))
        .chain(notifications.due_today.iter().map(|s| (false, s)))
        .collect()
}

pub fn render_notifications<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    state: &mut NotificationsState,
    notifications: &Notifications,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1), Constraint::Length(3)].as_ref())
        .split(area);

    let rows = rows(notifications);
    if state.list_state.selected().map_or(true, |i| i >= rows.len()) {
        state.list_state.select(if rows.is_empty() { None } else { Some(0) });
    }

    let items: Vec<ListItem> = rows
        .iter()
        .map(|(unseen, scoped)| {
            let (tag, color) = if *unseen {
                ("NEW  ", Color::LightRed)
            } else {
                ("DUE  ", Color::Yellow)
            };
            ListItem::new(Spans::from(vec![
                Span::styled(tag, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::raw(format!(
                    "{}  {}  {}  by {}",
                    scoped.folder_name,
                    money(scoped.invoice.amount),
                    scoped.invoice.date.format("%Y-%m-%d"),
                    scoped.invoice.created_by_email
                )),
            ]))
        })
        .collect();

    let title = format!(
        "Notifications ({} unseen, {} due today)",
        notifications.unseen.len(),
        notifications.due_today.len()
    );
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(list, chunks[0], &mut state.list_state);

    frame.render_widget(message_line(&state.message), chunks[1]);

    let buttons = Paragraph::new("<Enter> Open invoice")
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[2]);
}

pub fn handle_input(state: &mut NotificationsState, notifications: &Notifications) -> Result<Option<NotificationAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code, notifications));
    }
    Ok(None)
}

pub fn handle_key(
    state: &mut NotificationsState,
    key: KeyCode,
    notifications: &Notifications,
) -> Option<NotificationAction> {
    let rows = rows(notifications);
    state.message = None;
    match key {
        KeyCode::Down => state.list_state.select(step_selection(state.list_state.selected(), rows.len(), true)),
        KeyCode::Up => state.list_state.select(step_selection(state.list_state.selected(), rows.len(), false)),
        KeyCode::Enter => {
            return state
                .list_state
                .selected()
                .and_then(|i| rows.get(i))
                .map(|(unseen, scoped)| NotificationAction::Open {
                    folder_id: scoped.folder_id,
                    invoice_id: scoped.invoice.id,
                    unseen: *unseen,
                });
        }
        other => return nav_for_key(other, Role::Admin).map(NotificationAction::Nav),
    }
    None
}
