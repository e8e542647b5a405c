pub mod modules;
pub mod reviews;
pub mod status;
