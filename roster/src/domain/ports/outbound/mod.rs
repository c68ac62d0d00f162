mod auth_client;
mod key_value;
mod notifier;
mod table_store;

pub use auth_client::*;
pub use key_value::*;
pub use notifier::*;
pub use table_store::*;
