pub mod document;
pub mod sanitize;
pub mod totals;
