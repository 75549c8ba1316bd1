//! External service integrations.

pub mod email_client {
    pub use crate::email_client::*;
}

pub mod rest_storage {
    pub use crate::rest_storage::*;
}
