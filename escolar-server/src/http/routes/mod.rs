//! Route handlers organized by resource

pub mod health;
pub mod index;
pub mod resource;

use serde::Serialize;

/// `{"message": …}` success body
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

impl Message {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}
