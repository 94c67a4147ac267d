pub mod ping;
pub mod tcp;
