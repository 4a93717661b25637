use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

/// Keyboard date entry, one part at a time. The date is optional: Delete
/// clears it and typing into a cleared field starts from `fallback`.
pub struct DateInputState {
    pub date: Option<NaiveDate>,
    pub fallback: NaiveDate,
    pub editing: bool,
    pub date_part: DatePart,
    pub current_date_input: String,
}

impl DateInputState {
    pub fn new(date: Option<NaiveDate>, fallback: NaiveDate) -> Self {
        Self {
            date,
            fallback,
            editing: false,
            date_part: DatePart::Year,
            current_date_input: String::new(),
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.editing {
            self.date_part = DatePart::Year;
            self.current_date_input.clear();
        }
    }

    pub fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.current_date_input.clear();
    }

    pub fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.current_date_input.clear();
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.current_date_input.push(c);
                let wanted = if self.date_part == DatePart::Year { 4 } else { 2 };
                if self.current_date_input.len() == wanted {
                    self.commit_part();
                    self.current_date_input.clear();
                    if self.date_part != DatePart::Day {
                        self.next_date_part();
                    }
                }
            }
            KeyCode::Backspace => {
                self.current_date_input.pop();
            }
            KeyCode::Delete => {
                self.date = None;
                self.current_date_input.clear();
            }
            KeyCode::Right => self.next_date_part(),
            KeyCode::Left => self.previous_date_part(),
            _ => {}
        }
    }

    fn commit_part(&mut self) {
        let base = self.date.unwrap_or(self.fallback);
        let (year, month, day) = (base.year(), base.month(), base.day());
        let Ok(value) = self.current_date_input.parse::<u32>() else {
            return;
        };

        let candidate = match self.date_part {
            DatePart::Year if (1900..=2100).contains(&value) => {
                // Clamp the day so Feb 29 survives a move to a non-leap year.
                let day = day.min(days_in_month(value as i32, month));
                NaiveDate::from_ymd_opt(value as i32, month, day)
            }
            DatePart::Month if (1..=12).contains(&value) => {
                let day = day.min(days_in_month(year, value));
                NaiveDate::from_ymd_opt(year, value, day)
            }
            DatePart::Day if value >= 1 && value <= days_in_month(year, month) => {
                NaiveDate::from_ymd_opt(year, month, value)
            }
            _ => None,
        };

        if let Some(date) = candidate {
            self.date = Some(date);
        }
    }

    pub fn get_display_string(&self) -> String {
        let Some(date) = self.date else {
            return if self.editing && !self.current_date_input.is_empty() {
                format!("[{}]", self.current_date_input)
            } else {
                "—".to_string()
            };
        };

        let date_str = date.format("%Y-%m-%d").to_string();
        if !self.editing {
            return date_str;
        }

        let (year, month, day) = (&date_str[0..4], &date_str[5..7], &date_str[8..10]);
        let current_input = if !self.current_date_input.is_empty() {
            format!("[{}]", self.current_date_input)
        } else {
            match self.date_part {
                DatePart::Year => "[YYYY]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Day => "[DD]".to_string(),
            }
        };

        match self.date_part {
            DatePart::Year => format!("{}{}-{}-{}", year, current_input, month, day),
            DatePart::Month => format!("{}-{}{}-{}", year, month, current_input, day),
            DatePart::Day => format!("{}-{}-{}{}", year, month, day, current_input),
        }
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}
