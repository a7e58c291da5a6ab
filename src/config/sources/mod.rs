pub mod env;
pub mod global_file;
pub mod project_file;
