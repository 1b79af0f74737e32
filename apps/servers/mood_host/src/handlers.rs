pub mod health;
pub mod history;
pub mod team;
pub mod today;
