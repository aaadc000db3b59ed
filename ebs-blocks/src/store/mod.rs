pub mod store;
pub mod ebs;
pub mod memory;
