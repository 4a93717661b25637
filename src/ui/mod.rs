pub mod attachments;
pub mod components;
pub mod dashboard;
pub mod filter_panel;
pub mod home;
pub mod invoice_wizard;
pub mod login;
pub mod notifications;
pub mod payroll;
pub mod project_detail;
pub mod projects;

use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ledger::{breakdown::EMPTY_COLOR, Breakdown};
use crate::models::{Role, SessionUser};

/// Top-level views reachable from the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Home,
    Projects,
    Payroll,
    Notifications,
}

impl View {
    /// Landing view after sign-in.
    pub fn start(role: Role) -> Self {
        match role {
            Role::Admin => View::Dashboard,
            Role::Regular => View::Home,
        }
    }

    fn tabs(role: Role) -> &'static [(char, View, &'static str)] {
        match role {
            Role::Admin => &[
                ('1', View::Dashboard, "Dashboard"),
                ('2', View::Payroll, "Payroll"),
                ('3', View::Projects, "Projects"),
                ('4', View::Notifications, "Notifications"),
            ],
            Role::Regular => &[('1', View::Home, "Home"), ('3', View::Projects, "Projects")],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Go(View),
    Logout,
    Quit,
}

/// Keys shared by every top-level view. Views a role cannot see have no key.
pub fn nav_for_key(key: KeyCode, role: Role) -> Option<NavAction> {
    match key {
        KeyCode::Char('L') => Some(NavAction::Logout),
        KeyCode::Char('Q') => Some(NavAction::Quit),
        KeyCode::Char(c) => View::tabs(role)
            .iter()
            .find(|(k, _, _)| *k == c)
            .map(|(_, view, _)| NavAction::Go(*view)),
        _ => None,
    }
}

pub fn render_nav<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    user: &SessionUser,
    current: View,
    notification_count: usize,
) {
    let mut spans = vec![Span::styled(
        "DC Cable LLC ",
        Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
    )];
    for (key, view, label) in View::tabs(user.role) {
        let label = if *view == View::Notifications && notification_count > 0 {
            format!("{label} ({notification_count})")
        } else {
            label.to_string()
        };
        let style = if *view == current {
            Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!("<{key}> {label}"), style));
    }
    spans.push(Span::raw(format!(
        "   {} [{}]  <L> Logout  <Q> Quit",
        user.email,
        user.role.label()
    )));

    let nav = Paragraph::new(Spans::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(nav, area);
}

/// Dollar amount with thousands separators, e.g. `$12,345.60`.
pub fn money(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Next (or previous) row of a wrapping list selection.
pub fn step_selection(selected: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let i = match selected {
        Some(i) if forward => {
            if i >= len - 1 {
                0
            } else {
                i + 1
            }
        }
        Some(i) => {
            if i == 0 {
                len - 1
            } else {
                i - 1
            }
        }
        None => 0,
    };
    Some(i)
}

pub fn rgb(color: [u8; 3]) -> Color {
    Color::Rgb(color[0], color[1], color[2])
}

/// The breakdown chart drawn as one horizontal band, each project taking a
/// share of `width` proportional to its arc.
pub fn breakdown_band(breakdown: &Breakdown, width: u16) -> Spans<'static> {
    if breakdown.is_empty() {
        return Spans::from(Span::styled(
            "█".repeat(width as usize),
            Style::default().fg(rgb(EMPTY_COLOR)),
        ));
    }
    let spans: Vec<Span> = breakdown
        .arcs
        .iter()
        .map(|arc| {
            let cells = ((arc.degrees() / 360.0) * width as f64).round().max(1.0) as usize;
            Span::styled("█".repeat(cells), Style::default().fg(rgb(arc.color)))
        })
        .collect();
    Spans::from(spans)
}

pub fn paid_style(paid: bool) -> Style {
    if paid {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Yellow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(999.5), "$999.50");
        assert_eq!(money(1234567.891), "$1,234,567.89");
        assert_eq!(money(-1000.0), "-$1,000.00");
    }

    #[test]
    fn empty_breakdown_is_one_neutral_band() {
        let band = breakdown_band(&Breakdown { total: 0.0, arcs: Vec::new() }, 10);
        assert_eq!(band.0.len(), 1);
        assert_eq!(band.width(), 10);
        assert_eq!(band.0[0].style.fg, Some(rgb(EMPTY_COLOR)));
    }

    #[test]
    fn selection_wraps_both_ways() {
        assert_eq!(step_selection(None, 0, true), None);
        assert_eq!(step_selection(Some(2), 3, true), Some(0));
        assert_eq!(step_selection(Some(0), 3, false), Some(2));
        assert_eq!(step_selection(None, 3, false), Some(0));
    }

    #[test]
    fn nav_keys_depend_on_role() {
        assert_eq!(nav_for_key(KeyCode::Char('2'), Role::Admin), Some(NavAction::Go(View::Payroll)));
        assert_eq!(nav_for_key(KeyCode::Char('2'), Role::Regular), None);
        assert_eq!(nav_for_key(KeyCode::Char('1'), Role::Regular), Some(NavAction::Go(View::Home)));
        assert_eq!(nav_for_key(KeyCode::Char('L'), Role::Regular), Some(NavAction::Logout));
        assert_eq!(View::start(Role::Admin), View::Dashboard);
    }
}
