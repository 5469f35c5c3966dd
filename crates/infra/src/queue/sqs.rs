//! SQS メッセージキュー実装
//!
//! AWS SQS をロングポーリングで受信し、処理済みバッチを `DeleteMessageBatch` で削除する。

use async_trait::async_trait;
use aws_sdk_sqs::{
    Client,
    types::{DeleteMessageBatchRequestEntry, Message},
};

use super::{MessageQueue, QueueMessage};
use crate::error::InfraError;

/// 1 回の受信で取得する最大件数（SQS の上限）
const MAX_MESSAGES_PER_RECEIVE: i32 = 10;

/// SQS メッセージキュー
pub struct SqsMessageQueue {
    client:            Client,
    queue_url:         String,
    wait_time_seconds: i32,
}

impl SqsMessageQueue {
    /// 新しい SQS キューを作成する
    ///
    /// # 引数
    ///
    /// - `client`: AWS SQS クライアント
    /// - `queue_url`: キュー URL
    /// - `wait_time_seconds`: ロングポーリングの待機秒数（0〜20）
    pub fn new(client: Client, queue_url: String, wait_time_seconds: i32) -> Self {
        Self {
            client,
            queue_url,
            wait_time_seconds,
        }
    }
}

/// SQS のメッセージを [`QueueMessage`] に変換する
///
/// receipt handle が無いメッセージは削除できないためエラーとする。
/// 本文が無い場合は空文字として扱い、デコード時に不正レコードとして検出させる。
fn to_queue_message(message: &Message) -> Result<QueueMessage, InfraError> {
    let message_id = message.message_id().unwrap_or_default().to_string();
    let receipt_handle = message
        .receipt_handle()
        .ok_or_else(|| {
            InfraError::invalid_message(format!("receipt handle がありません: {message_id}"))
        })?
        .to_string();

    Ok(QueueMessage {
        message_id,
        receipt_handle,
        body: message.body().unwrap_or_default().to_string(),
    })
}

#[async_trait]
impl MessageQueue for SqsMessageQueue {
    #[tracing::instrument(skip_all, level = "debug", fields(queue_url = %self.queue_url))]
    async fn receive(&self) -> Result<Vec<QueueMessage>, InfraError> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(MAX_MESSAGES_PER_RECEIVE)
            .wait_time_seconds(self.wait_time_seconds)
            .send()
            .await
            .map_err(|e| InfraError::queue(format!("SQS 受信失敗: {e}")))?;

        output.messages().iter().map(to_queue_message).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(count = messages.len()))]
    async fn acknowledge(&self, messages: &[QueueMessage]) -> Result<(), InfraError> {
        if messages.is_empty() {
            return Ok(());
        }

        let entries = messages
            .iter()
            .enumerate()
            .map(|(index, message)| {
                DeleteMessageBatchRequestEntry::builder()
                    .id(index.to_string())
                    .receipt_handle(&message.receipt_handle)
                    .build()
                    .map_err(|e| InfraError::unexpected(format!("削除エントリ構築失敗: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let output = self
            .client
            .delete_message_batch()
            .queue_url(&self.queue_url)
            .set_entries(Some(entries))
            .send()
            .await
            .map_err(|e| InfraError::queue(format!("SQS 削除失敗: {e}")))?;

        if let Some(failed) = output.failed().first() {
            return Err(InfraError::queue(format!(
                "SQS 削除が一部失敗: {} 件（先頭 id={} code={} {}）",
                output.failed().len(),
                failed.id(),
                failed.code(),
                failed.message().unwrap_or_default()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::InfraErrorKind;

    #[test]
    fn to_queue_messageが各フィールドを取り出す() {
        let message = Message::builder()
            .message_id("m-1")
            .receipt_handle("rh-1")
            .body(r#"{"article_id":"a1"}"#)
            .build();

        let result = to_queue_message(&message).unwrap();

        assert_eq!(
            result,
            QueueMessage {
                message_id:     "m-1".to_string(),
                receipt_handle: "rh-1".to_string(),
                body:           r#"{"article_id":"a1"}"#.to_string(),
            }
        );
    }

    #[test]
    fn 本文が無いメッセージは空文字になる() {
        let message = Message::builder()
            .message_id("m-1")
            .receipt_handle("rh-1")
            .build();

        let result = to_queue_message(&message).unwrap();

        assert_eq!(result.body, "");
    }

    #[test]
    fn receipt_handleが無いメッセージはinvalid_messageになる() {
        let message = Message::builder().message_id("m-1").body("{}").build();

        let result = to_queue_message(&message);

        assert!(matches!(
            result.map_err(|e| e.into_parts().0),
            Err(InfraErrorKind::InvalidMessage(msg)) if msg.contains("m-1")
        ));
    }

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqsMessageQueue>();
    }
}
