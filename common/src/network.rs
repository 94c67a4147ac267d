pub mod device;
pub mod interface;
pub mod mac;
pub mod port;
pub mod range;
