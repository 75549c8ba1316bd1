// Domain-layer modules and shared errors/models
pub mod intake {
    pub use crate::intake::*;
}

pub mod validation {
    pub use crate::validation::*;
}

pub mod lead_forms {
    pub use crate::lead_forms::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
