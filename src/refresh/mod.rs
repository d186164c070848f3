mod coordinator;

pub use coordinator::{FreshToken, RefreshCoordinator};
