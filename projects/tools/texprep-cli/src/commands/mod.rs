pub mod inspect;
pub mod patch;
pub mod process;
