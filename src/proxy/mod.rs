pub mod identity;
pub mod pool;
