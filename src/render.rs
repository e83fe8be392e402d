pub mod composite;
pub mod preview;
