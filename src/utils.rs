pub mod data_uri;
pub mod file;
pub mod logging;
pub mod text;
