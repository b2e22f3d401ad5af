pub mod downloads;
pub mod health;
