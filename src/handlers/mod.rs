pub mod catalog;
pub mod health;
pub mod history;
pub mod recommendations;
pub mod schedule;
pub mod session;
