//! Noop 通知送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! 送信先を用意できないローカル確認で使用する。

use async_trait::async_trait;
use comment_notifier_domain::notification::{
    DeliveryReceipt,
    NotificationError,
    NotificationMessage,
};

use super::NotificationSender;

/// Noop 通知送信（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send_email(
        &self,
        message: &NotificationMessage,
    ) -> Result<DeliveryReceipt, NotificationError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "Noop: メール送信をスキップ"
        );
        Ok(DeliveryReceipt::default())
    }
}
