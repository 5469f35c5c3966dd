//! # メッセージキュー
//!
//! コメント投稿イベントを運ぶキューからの受信と ACK（削除）を抽象化する。
//!
//! ## 設計方針
//!
//! - **バッチ単位の ACK**: 受信したバッチは全件成功時のみまとめて削除する。
//!   削除しなかったメッセージは可視性タイムアウト後にキューが再配信する
//! - **再試行はキューに委ねる**: このモジュール自身は再試行しない

mod sqs;

use async_trait::async_trait;
pub use sqs::SqsMessageQueue;

use crate::error::InfraError;

/// キューから受信したメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    /// キューが採番したメッセージ ID
    pub message_id:     String,
    /// 削除時に必要なハンドル
    pub receipt_handle: String,
    /// メッセージ本文（JSON のコメントイベント）
    pub body:           String,
}

/// メッセージキュートレイト
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// メッセージを受信する（ロングポーリング）
    ///
    /// 待機時間内にメッセージが無ければ空の Vec を返す。
    async fn receive(&self) -> Result<Vec<QueueMessage>, InfraError>;

    /// 処理済みのメッセージを削除する
    async fn acknowledge(&self, messages: &[QueueMessage]) -> Result<(), InfraError>;
}
