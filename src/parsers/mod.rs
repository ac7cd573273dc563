//! Tool output parsers. Each one is best-effort: malformed input yields fewer
//! records, never an error.

pub mod ferox;
pub mod hostnames;
pub mod httpx;

pub use ferox::parse_discovered;
pub use hostnames::parse_subdomains;
pub use httpx::parse_live_hosts;
