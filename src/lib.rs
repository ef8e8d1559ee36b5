// Public library interface for treemap-rs
// The debug CLI tool builds on the same modules

pub mod layout;
pub mod tree;
