pub mod write_once;

pub use write_once::WriteOnce;
