//! UI components.

pub mod constellation;
