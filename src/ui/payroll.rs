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

use crate::ledger::{
    breakdown::{payroll_bars, project_totals},
    Breakdown,
};
use crate::models::Role;
use crate::service::Ledger;
use crate::ui::{
    breakdown_band,
    components::{
        popup::message_line,
        text_input::{edit_amount, parse_amount},
    },
    money, nav_for_key, rgb, step_selection, NavAction,
};

pub struct PayrollState {
    list_state: ListState,
    amount: Option<String>,
    pub message: Option<String>,
}

impl PayrollState {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            list_state,
            amount: None,
            message: None,
        }
    }
}

pub enum PayrollAction {
    Add { folder_id: Uuid, amount: f64 },
    Nav(NavAction),
}

pub fn render_payroll<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &mut PayrollState, ledger: &Ledger) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3), Constraint::Length(1)].as_ref())
        .split(columns[0]);

    let folders = &ledger.data().folders;
    if state.list_state.selected().map_or(true, |i| i >= folders.len()) {
        state.list_state.select(if folders.is_empty() { None } else { Some(0) });
    }

    let bar_room = left[0].width.saturating_sub(4) / 2;
    let items: Vec<ListItem> = payroll_bars(folders)
        .into_iter()
        .map(|bar| {
            let cells = (bar.width as usize * bar_room as usize) / 100;
            ListItem::new(vec![
                Spans::from(vec![
                    Span::raw(bar.name),
                    Span::styled(format!("  {}", money(bar.total)), Style::default().fg(Color::Gray)),
                ]),
                Spans::from(Span::styled("▇".repeat(cells), Style::default().fg(Color::Cyan))),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().title("Payroll by project").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(list, left[0], &mut state.list_state);

    let input = match &state.amount {
        Some(amount) => Paragraph::new(format!("{amount}_"))
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().title("Payroll amount (Enter to add, Esc to cancel)").borders(Borders::ALL)),
        None => Paragraph::new("<a> Add payroll to selected project")
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL)),
    };
    frame.render_widget(input, left[1]);
    frame.render_widget(message_line(&state.message), left[2]);

    let totals = project_totals(folders, &ledger.data().all_invoices(), None);
    let breakdown = Breakdown::payroll(&totals);
    let mut lines = vec![
        breakdown_band(&breakdown, columns[1].width.saturating_sub(2)),
        Spans::from(""),
        Spans::from(format!("Total payroll: {}", money(breakdown.total))),
        Spans::from(""),
    ];
    lines.extend(breakdown.arcs.iter().map(|arc| {
        Spans::from(vec![
            Span::styled("■ ", Style::default().fg(rgb(arc.color))),
            Span::raw(format!("{}  {}  {:.1}%", arc.name, money(arc.value), arc.percent())),
        ])
    }));
    if breakdown.is_empty() {
        lines.push(Spans::from(Span::styled("No payroll recorded yet.", Style::default().fg(Color::Gray))));
    }
    let shares = Paragraph::new(lines).block(Block::default().title("Payroll share").borders(Borders::ALL));
    frame.render_widget(shares, columns[1]);
}

pub fn handle_input(state: &mut PayrollState, folders: &[Uuid]) -> Result<Option<PayrollAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code, folders));
    }
    Ok(None)
}

pub fn handle_key(state: &mut PayrollState, key: KeyCode, folders: &[Uuid]) -> Option<PayrollAction> {
    let selected = state.list_state.selected().and_then(|i| folders.get(i)).copied();

    if let Some(amount) = &mut state.amount {
        match key {
            KeyCode::Esc => state.amount = None,
            KeyCode::Enter => {
                let parsed = parse_amount(amount).filter(|a| *a > 0.0);
                match (selected, parsed) {
                    (Some(folder_id), Some(amount)) => {
                        state.amount = None;
                        return Some(PayrollAction::Add { folder_id, amount });
                    }
                    (None, _) => state.amount = None,
                    (_, None) => state.message = Some("Enter an amount greater than zero.".to_string()),
                }
            }
            other => {
                edit_amount(amount, other);
            }
        }
        return None;
    }

    state.message = None;
    match key {
        KeyCode::Down => state.list_state.select(step_selection(state.list_state.selected(), folders.len(), true)),
        KeyCode::Up => state.list_state.select(step_selection(state.list_state.selected(), folders.len(), false)),
        KeyCode::Char('a') if selected.is_some() => state.amount = Some(String::new()),
        other => return nav_for_key(other, Role::Admin).map(PayrollAction::Nav),
    }
    None
}
