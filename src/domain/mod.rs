pub mod draw;
pub mod errors;
pub mod evaluation;
pub mod lottery;
pub mod ports;
