pub mod calculate;
pub mod health;
pub mod results;
pub mod upload;
