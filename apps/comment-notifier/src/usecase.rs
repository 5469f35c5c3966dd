//! # ユースケース層
//!
//! コメント投稿イベントを通知メールに変換して送信するパイプラインを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: 外部サービスを `Arc<dyn Trait>` で外部から注入
//! - **薄いアダプタ**: キュー起動・ローカル実行の両アダプタは同じパイプラインを呼ぶ
//!
//! ## モジュール構成
//!
//! - [`decode`]: バッチのデコード
//! - [`notification`]: テンプレートレンダリングと送信パイプライン

pub mod decode;
pub mod notification;

pub use decode::decode_batch;
pub use notification::{CommentNotificationService, TemplateRenderer};
