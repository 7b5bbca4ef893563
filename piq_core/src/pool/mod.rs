pub mod handler;
pub mod priority;
pub mod worker_pool;
