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

use crate::ledger::{Folder, FolderStatus};
use crate::models::SessionUser;
use crate::service::Ledger;
use crate::ui::{
    components::popup::{message_line, render_confirmation},
    filter_panel::{render_filters, FilterPanelState},
    money, nav_for_key, step_selection, NavAction,
};

// Represents the state of the project folder list
pub struct ProjectsState {
    pub filters: FilterPanelState,
    list_state: ListState,
    show_delete_confirmation: bool,
    pub message: Option<String>,
}

impl ProjectsState {
    pub fn new(ledger: &Ledger) -> Self {
        let mut list_state = ListState::default();
        if !ledger.data().folders.is_empty() {
            list_state.select(Some(0));
        }

        Self {
            filters: FilterPanelState::new(ledger.today()),
            list_state,
            show_delete_confirmation: false,
            message: None,
        }
    }

    /// Folders passing the current filters, in display order.
    pub fn visible<'a>(&self, folders: &'a [Folder]) -> Vec<&'a Folder> {
        self.filters.filter.folders(folders)
    }

    pub fn selected_id(&self, visible: &[Uuid]) -> Option<Uuid> {
        self.list_state.selected().and_then(|i| visible.get(i)).copied()
    }
}

pub enum ProjectAction {
    Open(Uuid),
    ToggleActive(Uuid),
    Delete(Uuid),
    Nav(NavAction),
}

pub fn render_projects<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    state: &mut ProjectsState,
    user: &SessionUser,
    ledger: &Ledger,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(4),
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    let folders = &ledger.data().folders;
    render_filters(frame, chunks[0], &state.filters, folders);

    let visible = state.visible(folders);
    if state.list_state.selected().map_or(true, |i| i >= visible.len()) {
        state.list_state.select(if visible.is_empty() { None } else { Some(0) });
    }

    let items: Vec<ListItem> = visible
        .iter()
        .map(|folder| {
            let status = FolderStatus::of(&folder.invoices);
            let status_style = match status {
                FolderStatus::Paid => Style::default().fg(Color::Green),
                FolderStatus::Unpaid => Style::default().fg(Color::Yellow),
                FolderStatus::NoInvoices => Style::default().fg(Color::Gray),
            };
            let total: f64 = folder.invoices.iter().map(|i| i.amount).sum();
            let mut spans = vec![
                Span::raw(folder.name.clone()),
                Span::raw(format!("  ({} invoices, {})  ", folder.invoices.len(), money(total))),
                Span::styled(status.label(), status_style),
            ];
            if !folder.is_active {
                spans.push(Span::styled("  [inactive]", Style::default().fg(Color::Red)));
            }
            if user.is_admin() {
                spans.push(Span::styled(
                    format!("  by {}", folder.owner_email),
                    Style::default().fg(Color::Gray),
                ));
            }
            ListItem::new(Spans::from(spans))
        })
        .collect();

    let projects_list = List::new(items)
        .block(Block::default().title("Projects").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(projects_list, chunks[1], &mut state.list_state);

    frame.render_widget(message_line(&state.message), chunks[2]);

    let buttons_text = if user.is_admin() {
        "<Enter> Open | <a> Toggle active | <d> Delete project"
    } else {
        "<Enter> Open"
    };
    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[3]);

    if state.show_delete_confirmation {
        render_confirmation(
            frame,
            "Are you sure you want to delete this project?",
            "All of its invoices will be removed as well.",
        );
    }
}

pub fn handle_input(
    state: &mut ProjectsState,
    user: &SessionUser,
    visible: &[Uuid],
    projects: &[Uuid],
) -> Result<Option<ProjectAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code, user, visible, projects));
    }
    Ok(None)
}

/// `visible` holds the filtered folder ids in display order; `projects` every
/// folder id, for cycling the project filter.
pub fn handle_key(
    state: &mut ProjectsState,
    key: KeyCode,
    user: &SessionUser,
    visible: &[Uuid],
    projects: &[Uuid],
) -> Option<ProjectAction> {
    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') => {
                state.show_delete_confirmation = false;
                return state.selected_id(visible).map(ProjectAction::Delete);
            }
            KeyCode::Char('n') | KeyCode::Esc => state.show_delete_confirmation = false,
            _ => {}
        }
        return None;
    }

    if state.filters.handle_key(key, projects) {
        state.list_state.select(None);
        return None;
    }

    match key {
        KeyCode::Down => state.list_state.select(step_selection(state.list_state.selected(), visible.len(), true)),
        KeyCode::Up => state.list_state.select(step_selection(state.list_state.selected(), visible.len(), false)),
        KeyCode::Enter => return state.selected_id(visible).map(ProjectAction::Open),
        KeyCode::Char('a') if user.is_admin() => {
            return state.selected_id(visible).map(ProjectAction::ToggleActive);
        }
        KeyCode::Char('d') if user.is_admin() => {
            if state.selected_id(visible).is_some() {
                state.show_delete_confirmation = true;
            }
        }
        other => return nav_for_key(other, user.role).map(ProjectAction::Nav),
    }
    None
}
