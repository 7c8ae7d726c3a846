// Draw sources
pub mod csv_source;
pub mod in_memory;

pub mod rng;
pub mod synthetic;
