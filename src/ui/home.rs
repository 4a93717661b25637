use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::ledger::InvoiceFilter;
use crate::models::{Role, SessionUser};
use crate::service::Ledger;
use crate::ui::{money, nav_for_key, NavAction};

pub fn render_home<B: Backend>(frame: &mut Frame<B>, area: Rect, user: &SessionUser, ledger: &Ledger) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(5), Constraint::Min(4)].as_ref())
        .split(area);

    let welcome = Paragraph::new(vec![
        Spans::from(Span::styled(
            format!("Welcome, {}", user.email),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Spans::from(""),
        Spans::from("Open Projects (3) to add invoices to an active project folder."),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(welcome, chunks[0]);

    let totals = ledger.totals(&InvoiceFilter::default());
    let summary = Paragraph::new(vec![
        Spans::from(format!("Your invoices: {}", totals.count())),
        Spans::from(Span::styled(
            format!("Paid: {} ({})", money(totals.paid), totals.paid_count),
            Style::default().fg(Color::Green),
        )),
        Spans::from(Span::styled(
            format!("Awaiting payment: {} ({})", money(totals.unpaid), totals.unpaid_count),
            Style::default().fg(Color::Yellow),
        )),
        Spans::from(format!("Active projects: {}", ledger.data().active_count())),
    ])
    .block(Block::default().title("Summary").borders(Borders::ALL));
    frame.render_widget(summary, chunks[1]);
}

pub fn handle_input() -> Result<Option<NavAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(key.code));
    }
    Ok(None)
}

pub fn handle_key(key: KeyCode) -> Option<NavAction> {
    nav_for_key(key, Role::Regular)
}
