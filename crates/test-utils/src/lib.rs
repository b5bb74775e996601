//! Shared test utilities for lintkit crates.
//!
//! - [`fixtures`]: small trees and engines
//! - [`probes`]: rules that record, report or panic on demand
//! - [`tracking`]: the log probe rules write into
//! - [`assertions`]: snapshot formatting of lint results

pub mod assertions;
pub mod fixtures;
pub mod probes;
pub mod tracking;

pub use assertions::{
    format_failures, format_format_outcome, format_messages, format_outcome, format_violations,
};
pub use fixtures::{class_file, engine, function_file, registry};
pub use probes::{describe_node, failing_provider, KindReporter, NodeFix, PanickingRule, RecordingRule};
pub use tracking::{events, Invocation, InvocationLog};

/// Send engine logs to the test output. Controlled by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
