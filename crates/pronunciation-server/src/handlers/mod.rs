pub mod evaluate;
pub mod health;
