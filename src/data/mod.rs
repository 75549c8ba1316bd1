//! Persistence: the store trait and its backends.

pub mod db {
    pub use crate::db::*;
}

pub mod db_storage {
    pub use crate::db_storage::*;
}

pub mod lead_store {
    pub use crate::lead_store::*;
}
