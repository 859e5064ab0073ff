// HMC REST session and response parsing
pub mod parse;
pub mod session;
pub mod types;

pub use session::HmcSession;
