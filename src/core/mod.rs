pub mod errors;
pub mod events;
pub mod models;
pub mod scheduler;
pub mod session;

pub use errors::ScanError;
pub use scheduler::Pipeline;
pub use session::SessionContext;
