pub mod calculation;
pub mod results;
pub mod upload;
