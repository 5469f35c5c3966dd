//! # Comment Notifier ライブラリ
//!
//! 通知パイプライン・設定・起動アダプタを公開する。
//! テスト用に内部モジュールへのアクセスを提供する。

pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;

// テストユーティリティ（内部実装、ドキュメントからは隠す）
#[doc(hidden)]
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
