pub mod date_input;
pub mod popup;
pub mod text_input;
