use chrono::NaiveDate;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use uuid::Uuid;

use crate::ledger::{Folder, InvoiceFilter};
use crate::ui::components::date_input::DateInputState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DateField {
    CreatedOn,
    CreatedFrom,
    CreatedTo,
    PaidOn,
}

impl DateField {
    const ALL: [DateField; 4] = [
        DateField::CreatedOn,
        DateField::CreatedFrom,
        DateField::CreatedTo,
        DateField::PaidOn,
    ];

    fn index(self) -> usize {
        match self {
            DateField::CreatedOn => 0,
            DateField::CreatedFrom => 1,
            DateField::CreatedTo => 2,
            DateField::PaidOn => 3,
        }
    }

    fn label(self) -> &'static str {
        match self {
            DateField::CreatedOn => "Created",
            DateField::CreatedFrom => "From",
            DateField::CreatedTo => "To",
            DateField::PaidOn => "Paid on",
        }
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

/// Filter controls shared by the dashboard and the project list.
///
/// `s` cycles status, `p` cycles project, `f` moves between date fields,
/// `e` edits the focused date and `c` clears everything.
pub struct FilterPanelState {
    pub filter: InvoiceFilter,
    pub focus: DateField,
    dates: [DateInputState; 4],
}

impl FilterPanelState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            filter: InvoiceFilter::default(),
            focus: DateField::CreatedOn,
            dates: [
                DateInputState::new(None, today),
                DateInputState::new(None, today),
                DateInputState::new(None, today),
                DateInputState::new(None, today),
            ],
        }
    }

    pub fn editing(&self) -> bool {
        self.dates[self.focus.index()].editing
    }

    /// Apply a key. Returns false when the key is not a filter key so the
    /// screen can handle it.
    pub fn handle_key(&mut self, key: KeyCode, projects: &[Uuid]) -> bool {
        if self.editing() {
            let input = &mut self.dates[self.focus.index()];
            match key {
                KeyCode::Enter | KeyCode::Esc => input.toggle_editing(),
                other => input.handle_input(other),
            }
            self.sync();
            return true;
        }

        match key {
            KeyCode::Char('s') => self.filter.status = self.filter.status.next(),
            KeyCode::Char('p') => self.cycle_project(projects),
            KeyCode::Char('f') => self.focus = self.focus.next(),
            KeyCode::Char('e') => self.dates[self.focus.index()].toggle_editing(),
            KeyCode::Char('c') => {
                for input in &mut self.dates {
                    input.date = None;
                }
                self.filter = InvoiceFilter::default();
            }
            _ => return false,
        }
        true
    }

    fn cycle_project(&mut self, projects: &[Uuid]) {
        let position = self
            .filter
            .project
            .and_then(|id| projects.iter().position(|p| *p == id));
        self.filter.project = match position {
            None => projects.first().copied(),
            Some(i) => projects.get(i + 1).copied(),
        };
    }

    fn sync(&mut self) {
        self.filter.created_on = self.dates[DateField::CreatedOn.index()].date;
        self.filter.created_from = self.dates[DateField::CreatedFrom.index()].date;
        self.filter.created_to = self.dates[DateField::CreatedTo.index()].date;
        self.filter.paid_on = self.dates[DateField::PaidOn.index()].date;
    }
}

pub fn render_filters<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    state: &FilterPanelState,
    folders: &[Folder],
) {
    let project = state
        .filter
        .project
        .and_then(|id| folders.iter().find(|f| f.id == id))
        .map(|f| f.name.as_str())
        .unwrap_or("All");

    let mut spans = vec![
        Span::raw(format!("Status: {}  ", state.filter.status.label())),
        Span::raw(format!("Project: {project}  ")),
    ];
    for field in DateField::ALL {
        let style = if field == state.focus {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        spans.push(Span::styled(
            format!("{}: {}  ", field.label(), state.dates[field.index()].get_display_string()),
            style,
        ));
    }

    let panel = Paragraph::new(vec![
        Spans::from(spans),
        Spans::from(Span::styled(
            "<s> Status <p> Project <f> Next date <e> Edit date <c> Clear",
            Style::default().fg(Color::Gray),
        )),
    ])
    .block(Block::default().title("Filters").borders(Borders::ALL));
    frame.render_widget(panel, area);
}
