//! List envelope

use serde::{Deserialize, Serialize};

/// Collection response: `{ "value": [...] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub value: Vec<T>,
}
