pub mod date;
pub mod flash;
