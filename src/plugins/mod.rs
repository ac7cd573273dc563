pub mod dirbuster;
pub mod httpx_probe;
pub mod registry;
pub mod subfinder;
pub mod types;
