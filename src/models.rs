pub mod error;
pub mod message;
pub mod mod_dto;
