pub mod activity;
pub mod health;
pub mod response;
pub mod sale;
pub mod template;
