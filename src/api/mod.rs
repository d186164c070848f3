//! Typed endpoint families. Every call goes through [`Gateway::dispatch`](crate::Gateway::dispatch).

mod events;
mod friends;
mod messages;
mod profile;

pub use events::EventsApi;
pub use friends::FriendsApi;
pub use messages::MessagesApi;
pub use profile::ProfileApi;

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
