pub mod pool;
pub mod records;
