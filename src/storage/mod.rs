pub mod memory_storage;
pub mod object_storage;
