//! Persisted records: users, chats, chat messages.

mod chat_record;
mod message_record;
mod role;
mod user_record;

pub use chat_record::ChatRecord;
pub use message_record::MessageRecord;
pub use role::Role;
pub use user_record::UserRecord;
