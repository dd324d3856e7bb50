pub mod arm;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::module_name_repetitions)]
pub mod arm7tdmi;
pub mod condition;
pub mod psr;
pub mod registers;
