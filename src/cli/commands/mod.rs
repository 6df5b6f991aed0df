pub mod checkpoint;
pub mod config;
pub mod db;
pub mod export;
pub mod init;
pub mod list;
pub mod log;
pub mod reconcile;
pub mod sync;
pub mod watch;
