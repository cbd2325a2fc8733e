mod orchestrator;
mod state;
#[cfg(test)]
mod tests;

pub use orchestrator::*;
pub use state::*;
