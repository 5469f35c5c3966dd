//! # Comment Notifier インフラ層
//!
//! 外部サービスとの通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! ユースケースが依存する外部サービスをトレイトで抽象化し、その具体実装を提供する。
//! 外部サービスの詳細をカプセル化し、パイプラインをプロバイダの変更から保護する。
//!
//! ## 責務
//!
//! - **コンテンツソース**: Contentful から記事属性を取得
//! - **通知送信**: SendGrid / SMTP / SES / Noop によるメール送信
//! - **キュー**: SQS からのコメントイベント受信と削除（ACK）
//!
//! ## 依存関係
//!
//! ```text
//! app → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`content`] - 記事属性取得トレイトと Contentful 実装
//! - [`notification`] - メール送信トレイトと各プロバイダ実装
//! - [`queue`] - メッセージキュートレイトと SQS 実装
//! - [`error`] - インフラ層エラー定義

pub mod content;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;
pub mod queue;

pub use error::{InfraError, InfraErrorKind};
