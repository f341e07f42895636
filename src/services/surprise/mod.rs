pub mod announcement;
pub mod channel_creator;
pub mod channel_deleter;
pub mod chat;
pub mod rollover;
