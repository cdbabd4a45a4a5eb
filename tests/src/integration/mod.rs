//! Cross-subsystem integration tests.

#[cfg(test)]
mod fixtures;

mod broadcast;
mod flows;
mod selection;
