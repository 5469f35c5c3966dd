//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! ローカル実行では Mailpit 等のローカル SMTP サーバーに接続する。

use async_trait::async_trait;
use comment_notifier_domain::notification::{
    DeliveryReceipt,
    Mailbox,
    NotificationError,
    NotificationMessage,
};
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Message, header::ContentType},
};

use super::NotificationSender;

/// SMTP 通知送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
pub struct SmtpNotificationSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotificationSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `host`: SMTP サーバーのホスト名（例: "localhost"）
    /// - `port`: SMTP サーバーのポート番号（例: 1025 for Mailpit）
    pub fn new(host: &str, port: u16) -> Self {
        // builder_dangerous: TLS なしで接続（Mailpit 等のローカル SMTP 向け）
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .build();

        Self { transport }
    }
}

/// lettre の Mailbox に変換する
fn to_lettre_mailbox(mailbox: &Mailbox) -> Result<lettre::message::Mailbox, NotificationError> {
    let address = mailbox
        .address
        .parse()
        .map_err(|e| NotificationError::InvalidAddress(format!("{}: {e}", mailbox.address)))?;
    Ok(lettre::message::Mailbox::new(mailbox.name.clone(), address))
}

/// 送信メッセージを組み立てる（プレーンテキストのみ）
fn build_message(message: &NotificationMessage) -> Result<Message, NotificationError> {
    Message::builder()
        .from(to_lettre_mailbox(&message.from)?)
        .to(to_lettre_mailbox(&message.to)?)
        .subject(&message.subject)
        .header(ContentType::TEXT_PLAIN)
        .body(message.body.clone())
        .map_err(|e| NotificationError::SendFailed(format!("メッセージ構築失敗: {e}")))
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_email(
        &self,
        message: &NotificationMessage,
    ) -> Result<DeliveryReceipt, NotificationError> {
        let email = build_message(message)?;

        let response = self
            .transport
            .send(email)
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SMTP 送信失敗: {e}")))?;

        Ok(DeliveryReceipt {
            status_code: response.code().to_string().parse().ok(),
            message_id:  None,
        })
    }
}
