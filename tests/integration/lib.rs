
pub(crate) use counter_logic::*;

mod concurrency_tests;
mod observation_tests;
