mod extract;
mod validate;

pub use extract::{extract_id, resolve_id};
pub use validate::{ensure_valid, validate};
