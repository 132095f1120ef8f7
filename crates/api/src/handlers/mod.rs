pub mod inference;
pub mod upload;
