pub mod commit;
pub mod github;
#[cfg(test)]
pub mod mock;
pub mod outputs;
pub mod package_manager;
pub mod source;
pub mod update;
