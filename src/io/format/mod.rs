pub mod csv;
pub mod json;
pub mod jsonl;
pub mod yaml;
