pub mod trace_probe;
pub mod verify_handler;

pub use verify_handler::handle_verify;
