//! Command implementations.

mod generate;
mod info;
mod validate;

pub use generate::run_generate;
pub use info::run_info;
pub use validate::run_validate;
