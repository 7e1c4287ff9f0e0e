pub mod arrivals;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod policy;
pub mod queue;
pub mod road;
pub mod sim;
pub mod viz;

#[cfg(test)]
mod test;
