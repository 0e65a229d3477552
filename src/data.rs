pub mod photo;
pub mod student;
