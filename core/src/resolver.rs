pub mod hostname;
pub mod neighbor;
