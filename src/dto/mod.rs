pub mod game;
pub mod health;
pub mod message;
pub mod validation;
