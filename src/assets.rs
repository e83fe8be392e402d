pub mod catalog;
pub mod decode;
pub mod image_asset;
pub mod registry;
