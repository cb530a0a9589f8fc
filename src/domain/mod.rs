pub mod message;
pub mod validation;
