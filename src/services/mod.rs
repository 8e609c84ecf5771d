pub mod accessor;
#[cfg(any(test, feature = "runtime"))]
pub mod tracing_setup;
