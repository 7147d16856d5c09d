pub mod json;

pub use json::{BatchSummary, JsonFormatter};
