//! Cross-crate tests: sweeps driven end to end through `Sweeper` with
//! instrumented capabilities standing in for the network.

#[cfg(test)]
mod support;

#[cfg(test)]
mod discovery;

#[cfg(test)]
mod ports;
