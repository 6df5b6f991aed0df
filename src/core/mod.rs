pub mod evidence;
pub mod list;
pub mod log;
pub mod presence_index;
pub mod reconcile;
pub mod scheduler;
pub mod segmenter;
pub mod sync;
