pub mod hash;
pub mod num;
pub mod time;
