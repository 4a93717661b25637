use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table},
    Frame,
};
use uuid::Uuid;

use crate::ledger::{breakdown::project_totals, Breakdown, Totals};
use crate::models::Role;
use crate::service::Ledger;
use crate::ui::{
    breakdown_band,
    components::{popup::message_line, text_input::edit_text},
    filter_panel::{render_filters, FilterPanelState},
    money, nav_for_key, rgb, NavAction,
};

pub struct DashboardState {
    pub filters: FilterPanelState,
    pub new_project: Option<String>,
    pub message: Option<String>,
}

impl DashboardState {
    pub fn new(ledger: &Ledger) -> Self {
        Self {
            filters: FilterPanelState::new(ledger.today()),
            new_project: None,
            message: None,
        }
    }
}

pub enum DashboardAction {
    CreateProject(String),
    Nav(NavAction),
}

pub fn render_dashboard<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    state: &DashboardState,
    ledger: &Ledger,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(4), // Filters
                Constraint::Length(4), // Totals
                Constraint::Length(3), // Paid share
                Constraint::Length(3), // Unpaid share
                Constraint::Min(6),    // Breakdown
                Constraint::Length(3), // New project
                Constraint::Length(1), // Message
            ]
            .as_ref(),
        )
        .split(area);

    let data = ledger.data();
    render_filters(frame, chunks[0], &state.filters, &data.folders);

    let filter = &state.filters.filter;
    let totals = ledger.totals(filter);
    render_totals(frame, chunks[1], &totals, data.active_count(), data.folders.len());

    let paid = Gauge::default()
        .block(Block::default().title("Paid").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(totals.share(totals.paid).round().clamp(0.0, 100.0) as u16);
    frame.render_widget(paid, chunks[2]);

    let unpaid = Gauge::default()
        .block(Block::default().title("Unpaid").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Yellow))
        .percent(totals.share(totals.unpaid).round().clamp(0.0, 100.0) as u16);
    frame.render_widget(unpaid, chunks[3]);

    let filtered = ledger.filtered_invoices(filter);
    let project_rows = project_totals(&data.folders, &filtered, filter.project);
    let breakdown = Breakdown::invoices(&project_rows);
    let band_width = chunks[4].width.saturating_sub(2);

    let mut rows = vec![Row::new(vec![Cell::from(breakdown_band(&breakdown, band_width))])
        .height(2)];
    rows.extend(project_rows.iter().map(|project| {
        let share = breakdown
            .arcs
            .iter()
            .find(|arc| arc.project_id == project.id)
            .map(|arc| arc.percent())
            .unwrap_or(0.0);
        Row::new(vec![
            Cell::from(Spans::from(vec![
                Span::styled("■ ", Style::default().fg(rgb(project.color))),
                Span::raw(project.name.clone()),
            ])),
            Cell::from(money(project.paid)),
            Cell::from(money(project.unpaid)),
            Cell::from(money(project.total)),
            Cell::from(format!("{share:.1}%")),
        ])
    }));

    let table = Table::new(rows)
        .header(
            Row::new(vec!["Project", "Paid", "Unpaid", "Total", "Share"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().title("Invoices by project").borders(Borders::ALL))
        .widths(&[
            Constraint::Percentage(36),
            Constraint::Percentage(16),
            Constraint::Percentage(16),
            Constraint::Percentage(16),
            Constraint::Percentage(16),
        ]);
    frame.render_widget(table, chunks[4]);

    let new_project = match &state.new_project {
        Some(name) => Paragraph::new(format!("{name}_"))
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().title("New project (Enter to create, Esc to cancel)").borders(Borders::ALL)),
        None => Paragraph::new("<n> New project")
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL)),
    };
    frame.render_widget(new_project, chunks[5]);

    frame.render_widget(message_line(&state.message), chunks[6]);
}

fn render_totals<B: Backend>(frame: &mut Frame<B>, area: Rect, totals: &Totals, active: usize, folders: usize) {
    let text = vec![
        Spans::from(vec![
            Span::styled(format!("Paid: {} ({})   ", money(totals.paid), totals.paid_count), Style::default().fg(Color::Green)),
            Span::styled(format!("Unpaid: {} ({})   ", money(totals.unpaid), totals.unpaid_count), Style::default().fg(Color::Yellow)),
            Span::styled(format!("Overdue: {}", money(totals.overdue)), Style::default().fg(Color::Red)),
        ]),
        Spans::from(format!(
            "Total: {} across {} invoices | Active projects: {active}/{folders}",
            money(totals.total()),
            totals.count()
        )),
    ];
    let paragraph = Paragraph::new(text).block(Block::default().title("Totals").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

pub fn handle_input(state: &mut DashboardState, projects: &[Uuid]) -> Result<Option<DashboardAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code, projects));
    }
    Ok(None)
}

pub fn handle_key(state: &mut DashboardState, key: KeyCode, projects: &[Uuid]) -> Option<DashboardAction> {
    if let Some(name) = &mut state.new_project {
        match key {
            KeyCode::Esc => state.new_project = None,
            KeyCode::Enter => {
                let name = name.clone();
                state.new_project = None;
                return Some(DashboardAction::CreateProject(name));
            }
            other => {
                edit_text(name, other);
            }
        }
        return None;
    }

    if state.filters.handle_key(key, projects) {
        return None;
    }

    match key {
        KeyCode::Char('n') => {
            state.message = None;
            state.new_project = Some(String::new());
            None
        }
        other => nav_for_key(other, Role::Admin).map(DashboardAction::Nav),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::StatusFilter;
    use crate::ui::filter_panel::FilterPanelState;
    use crate::ui::View;
    use chrono::NaiveDate;

    fn state() -> DashboardState {
        DashboardState {
            filters: FilterPanelState::new(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()),
            new_project: None,
            message: Some("old".to_string()),
        }
    }

    #[test]
    fn typing_a_project_name_swallows_nav_keys() {
        let mut state = state();
        assert!(handle_key(&mut state, KeyCode::Char('n'), &[]).is_none());
        assert!(state.message.is_none());
        for c in "Site 2".chars() {
            assert!(handle_key(&mut state, KeyCode::Char(c), &[]).is_none());
        }
        match handle_key(&mut state, KeyCode::Enter, &[]) {
            Some(DashboardAction::CreateProject(name)) => assert_eq!(name, "Site 2"),
            _ => panic!("expected project creation"),
        }
        assert!(state.new_project.is_none());
    }

    #[test]
    fn filter_keys_take_precedence_over_nav() {
        let mut state = state();
        assert!(handle_key(&mut state, KeyCode::Char('s'), &[]).is_none());
        assert_eq!(state.filters.filter.status, StatusFilter::Paid);

        assert!(matches!(
            handle_key(&mut state, KeyCode::Char('2'), &[]),
            Some(DashboardAction::Nav(NavAction::Go(View::Payroll)))
        ));
    }
}
