//! SES 通知送信実装
//!
//! AWS SES v2 API を使用してメールを送信する。

use async_trait::async_trait;
use aws_sdk_sesv2::{
    Client,
    types::{Body, Content, Destination, EmailContent, Message},
};
use comment_notifier_domain::notification::{
    DeliveryReceipt,
    NotificationError,
    NotificationMessage,
};

use super::NotificationSender;

/// SES 通知送信
///
/// `aws_sdk_sesv2::Client` をラップする。
/// 送信元アドレスは SES で検証済みであること。
pub struct SesNotificationSender {
    client: Client,
}

impl SesNotificationSender {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationSender for SesNotificationSender {
    async fn send_email(
        &self,
        message: &NotificationMessage,
    ) -> Result<DeliveryReceipt, NotificationError> {
        let destination = Destination::builder()
            .to_addresses(&message.to.address)
            .build();

        let content = EmailContent::builder()
            .simple(
                Message::builder()
                    .subject(
                        Content::builder()
                            .data(&message.subject)
                            .charset("UTF-8")
                            .build()
                            .map_err(|e| {
                                NotificationError::SendFailed(format!("件名構築失敗: {e}"))
                            })?,
                    )
                    .body(
                        Body::builder()
                            .text(
                                Content::builder()
                                    .data(&message.body)
                                    .charset("UTF-8")
                                    .build()
                                    .map_err(|e| {
                                        NotificationError::SendFailed(format!(
                                            "テキスト本文構築失敗: {e}"
                                        ))
                                    })?,
                            )
                            .build(),
                    )
                    .build(),
            )
            .build();

        let output = self
            .client
            .send_email()
            .from_email_address(message.from.to_string())
            .destination(destination)
            .content(content)
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SES 送信失敗: {e}")))?;

        Ok(DeliveryReceipt {
            status_code: None,
            message_id:  output.message_id().map(str::to_string),
        })
    }
}
