//! Wire DTOs for listing bodies.
//!
//! Body formats belong to the service; these mirror just enough of them
//! to pull id listings out of JSON responses.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceListing {
    pub spaces: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPage {
    pub contents: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListing {
    pub tasks: Vec<String>,
}
