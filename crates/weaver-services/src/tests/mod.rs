//! Unit and behaviour tests for the service registry.

mod support;
