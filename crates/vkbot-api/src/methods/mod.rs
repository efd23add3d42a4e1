//! API method categories.

mod messages;
mod stories;

pub use messages::{Messages, SendMessage};
pub use stories::{Interaction, SearchQuery, Stories, UploadOptions};
