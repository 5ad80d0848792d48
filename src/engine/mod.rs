pub mod memory;
pub mod session;
