#[cfg(test)]
#[allow(dead_code)]
pub mod contract;
pub use contract::*;

pub use engine::*;

#[cfg(test)]
#[allow(dead_code)]
pub mod test_data;
pub use test_data::*;

#[cfg(test)]
#[allow(dead_code)]
pub mod simulate_world_state;
pub use simulate_world_state::*;
