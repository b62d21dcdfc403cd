pub mod config;
pub mod corpus;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod layouts;
pub mod optimizer;
pub mod ranking;
pub mod scorer;
// cmd and reports belong to the binary (main.rs).
