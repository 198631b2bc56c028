// Models module - Database entity representations

pub mod activity;
pub mod broadcast;
pub mod event;
pub mod guest;
pub mod learning_credit;
pub mod meeting;
pub mod notification;
pub mod one_to_one;
pub mod referral;
pub mod revenue;
pub mod user;

pub use broadcast::Broadcast;
pub use event::Event;
pub use guest::Guest;
pub use learning_credit::LearningCredit;
pub use meeting::Meeting;
pub use notification::Notification;
pub use one_to_one::OneToOne;
pub use referral::Referral;
pub use revenue::Revenue;
pub use user::User;
