use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Spans,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Yes/no confirmation box drawn over the current screen.
pub fn render_confirmation<B: Backend>(frame: &mut Frame<B>, question: &str, detail: &str) {
    let popup_area = centered_rect(50, 25, frame.size());

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(question.to_string()),
        Spans::from(""),
        Spans::from(detail.to_string()),
        Spans::from(""),
        Spans::from("<Y> Yes  <N> No"),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().title("Confirm Delete").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

/// One-line status or error text at the bottom of a screen.
pub fn message_line(message: &Option<String>) -> Paragraph<'static> {
    match message {
        Some(text) => Paragraph::new(text.clone()).style(Style::default().fg(Color::Red)),
        None => Paragraph::new(""),
    }
}

// Helper function to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
