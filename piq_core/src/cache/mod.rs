pub mod binary_cache;
