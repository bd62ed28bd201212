mod confirm;
mod console;
mod runner;
pub(crate) mod summary;
mod target;


pub(crate) use confirm::confirm_ownership;
pub(crate) use runner::{RunOutputs, plan_from_args, run_volley};
pub(crate) use target::validate_target;
