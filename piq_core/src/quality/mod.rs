pub mod diagnosis;
pub mod policy;
pub mod thumbnail;
