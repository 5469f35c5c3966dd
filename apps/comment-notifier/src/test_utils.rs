//! テストユーティリティ

mod notifier_test_builder;

pub use notifier_test_builder::{NotifierTestBuilder, NotifierTestSetup};
