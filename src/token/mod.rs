mod session;
mod store;

pub use session::SessionTokenStore;
pub use store::{TokenData, TokenStore};
