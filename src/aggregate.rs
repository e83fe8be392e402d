pub mod draft;
pub mod info;
pub mod item;
