pub mod files;
pub mod path;
pub mod projects;
pub mod resolve;
