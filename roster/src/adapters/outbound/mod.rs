mod file_kv;
mod http_auth;
mod memory;
mod memory_auth;
mod memory_kv;
mod postgrest;

pub use file_kv::*;
pub use http_auth::*;
pub use memory::*;
pub use memory_auth::*;
pub use memory_kv::*;
pub use postgrest::RestTableStore;
