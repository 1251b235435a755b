pub mod evaluate;
pub mod predicate;
pub mod run;
