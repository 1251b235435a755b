pub mod dataset;
pub mod error;
pub mod expectation;
pub mod run;
