//! # キューワーカー
//!
//! キューをロングポーリングし、受信したメッセージを 1 バッチとして通知する。
//!
//! ## バッチの扱い
//!
//! - 受信 0 件: 何もしない
//! - 通知がすべて成功: バッチ全体を ACK（削除）する
//! - どこかで失敗: エラーを記録し、ACK しない。メッセージは可視性タイムアウト後に
//!   キューから再配信される（送信済みのイベントも再送される）

use std::{future::Future, sync::Arc, time::Duration};

use comment_notifier_infra::{
    InfraError,
    queue::{MessageQueue, QueueMessage},
};
use comment_notifier_shared::{
    event_log::{error, event},
    log_business_event,
};
use thiserror::Error;

use crate::{error::NotifyError, usecase::CommentNotificationService};

/// 受信エラー後に次のポーリングまで待つ時間
const RECEIVE_ERROR_PAUSE: Duration = Duration::from_secs(5);

/// ワーカーのエラー
#[derive(Debug, Error)]
pub enum WorkerError {
    /// キューの受信・削除に失敗
    #[error("キュー操作に失敗: {0}")]
    Queue(#[from] InfraError),

    /// バッチの通知に失敗
    #[error("バッチの通知に失敗: {0}")]
    Notify(#[from] NotifyError),
}

impl WorkerError {
    /// ログに付ける `(error.category, error.kind)` を返す
    pub fn log_context(&self) -> (&'static str, &'static str) {
        match self {
            Self::Queue(_) => (error::category::INFRASTRUCTURE, error::kind::QUEUE),
            Self::Notify(e) => e.log_context(),
        }
    }

    /// 分類付きでエラーログを出す
    ///
    /// キューエラーは SpanTrace を含む Debug 表現で出す。
    pub fn log(&self, message: &str) {
        let (category, kind) = self.log_context();
        match self {
            Self::Queue(inner) => tracing::error!(
                error.category = category,
                error.kind = kind,
                error = ?inner,
                "{message}"
            ),
            Self::Notify(inner) => tracing::error!(
                error.category = category,
                error.kind = kind,
                "{message}: {inner}"
            ),
        }
    }
}

/// 1 回のポーリング結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// メッセージが無かった
    Idle,
    /// バッチを通知して ACK した（件数）
    Delivered(usize),
}

/// キューワーカー
pub struct QueueWorker {
    queue:   Arc<dyn MessageQueue>,
    service: Arc<CommentNotificationService>,
}

impl QueueWorker {
    pub fn new(queue: Arc<dyn MessageQueue>, service: Arc<CommentNotificationService>) -> Self {
        Self { queue, service }
    }

    /// 1 回ポーリングしてバッチを処理する
    pub async fn poll_once(&self) -> Result<PollOutcome, WorkerError> {
        let messages = self.queue.receive().await?;
        if messages.is_empty() {
            tracing::debug!("受信メッセージなし");
            return Ok(PollOutcome::Idle);
        }

        self.handle_batch(&messages).await
    }

    /// 受信したバッチを通知し、成功した場合のみ ACK する
    ///
    /// 空のバッチは `EmptyBatch` で失敗する。
    #[tracing::instrument(skip_all, fields(batch_size = messages.len()))]
    pub async fn handle_batch(&self, messages: &[QueueMessage]) -> Result<PollOutcome, WorkerError> {
        let Some(first) = messages.first() else {
            return Err(NotifyError::EmptyBatch.into());
        };
        let records: Vec<&str> = messages.iter().map(|m| m.body.as_str()).collect();

        match self.service.process_records(&records).await {
            Ok(delivered) => {
                self.queue.acknowledge(messages).await?;
                log_business_event!(
                    event.category = event::category::QUEUE,
                    event.action = event::action::BATCH_ACKNOWLEDGED,
                    event.entity_type = event::entity_type::BATCH,
                    event.entity_id = %first.message_id,
                    event.result = event::result::SUCCESS,
                    batch.delivered = delivered,
                    "バッチを ACK"
                );
                Ok(PollOutcome::Delivered(delivered))
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::QUEUE,
                    event.action = event::action::BATCH_REJECTED,
                    event.entity_type = event::entity_type::BATCH,
                    event.entity_id = %first.message_id,
                    event.result = event::result::FAILURE,
                    error = %e,
                    "バッチを ACK せず再配信に委ねる"
                );
                Err(e.into())
            }
        }
    }

    /// 停止シグナルを受けるまでポーリングを続ける
    ///
    /// バッチ処理中に停止シグナルを受けた場合、そのバッチの処理が終わってから停止する。
    pub async fn run(&self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);

        loop {
            let received = tokio::select! {
                biased;
                () = &mut shutdown => {
                    tracing::info!("停止シグナルを受信");
                    return;
                }
                received = self.queue.receive() => received,
            };

            let messages = match received {
                Ok(messages) => messages,
                Err(e) => {
                    tracing::error!(
                        error.category = error::category::INFRASTRUCTURE,
                        error.kind = error::kind::QUEUE,
                        error = ?e,
                        "メッセージ受信に失敗"
                    );
                    tokio::select! {
                        () = &mut shutdown => return,
                        () = tokio::time::sleep(RECEIVE_ERROR_PAUSE) => continue,
                    }
                }
            };

            if messages.is_empty() {
                continue;
            }

            if let Err(e) = self.handle_batch(&messages).await {
                e.log("バッチ処理に失敗");
            }
        }
    }
}
