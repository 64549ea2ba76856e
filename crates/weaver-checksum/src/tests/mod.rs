//! Crate-level unit and behaviour tests for checksum construction.

mod unit;
