pub mod decoders;
pub mod imap_client;
pub mod mime;

pub use imap_client::{MailboxSession, collect_unread, fetch_unread_since, imap_since_date};
