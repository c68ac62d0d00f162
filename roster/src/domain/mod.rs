mod auth;
mod calendar;
mod error;
mod pipeline;
mod session;
mod time_of_day;

pub mod models;
pub mod ports;
pub mod services;

pub use auth::*;
pub use calendar::*;
pub use error::*;
pub use pipeline::*;
pub use session::*;
pub use time_of_day::*;
