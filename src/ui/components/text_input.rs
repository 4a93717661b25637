use crossterm::event::KeyCode;

/// Apply a key to a free-text buffer. Returns false for keys it ignores.
pub fn edit_text(buffer: &mut String, key: KeyCode) -> bool {
    match key {
        KeyCode::Char(c) => {
            buffer.push(c);
            true
        }
        KeyCode::Backspace => {
            buffer.pop();
            true
        }
        _ => false,
    }
}

/// Like [`edit_text`], but only accepts what can still become a decimal amount.
pub fn edit_amount(buffer: &mut String, key: KeyCode) -> bool {
    match key {
        KeyCode::Char(c) if c.is_ascii_digit() => {
            buffer.push(c);
            true
        }
        KeyCode::Char('.') if !buffer.contains('.') => {
            buffer.push('.');
            true
        }
        KeyCode::Backspace => {
            buffer.pop();
            true
        }
        _ => false,
    }
}

/// Parse an amount buffer; empty or unparsable text is `None`.
pub fn parse_amount(buffer: &str) -> Option<f64> {
    buffer.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
