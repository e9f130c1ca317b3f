//! Application services - Business logic orchestration

pub mod tags;

pub use tags::Tags;
