//! QuickJS sandbox via rquickjs

pub mod bindings;
pub mod runtime;

pub use runtime::JsSandbox;
