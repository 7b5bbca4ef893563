pub mod http_image_fetcher;
pub mod options;
pub mod priority;
