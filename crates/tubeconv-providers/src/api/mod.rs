pub mod form_api;
pub mod json_api;
