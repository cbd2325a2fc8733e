mod manager;
mod processor;
mod request;
mod worker;

pub use manager::*;
pub use processor::*;
pub use request::*;
pub use worker::*;
