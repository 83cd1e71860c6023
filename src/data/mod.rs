//! Data structures used to store joints.

pub mod arena;
