pub mod document;
pub mod events;
pub mod host;
pub mod selector;
