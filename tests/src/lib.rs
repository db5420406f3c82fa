//! Host-based integration tests for the frequency meter

#[cfg(test)]
mod property_tests;
#[cfg(test)]
mod scenario_tests;
