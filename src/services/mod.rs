// Services module - Business logic

pub mod analytics;
pub mod bootstrap;
pub mod engagement;
pub mod mailer;
pub mod password;
pub mod token;
