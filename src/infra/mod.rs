pub mod gallery_adapter;
pub mod http_transform_adapter;
