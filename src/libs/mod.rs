pub mod bump;
pub mod changelog;
pub mod commits;
pub mod data;
pub mod error;
pub mod tag;
pub mod version;
