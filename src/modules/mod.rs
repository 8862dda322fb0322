pub mod catalog;
pub mod play;
pub mod session;
pub mod track;
