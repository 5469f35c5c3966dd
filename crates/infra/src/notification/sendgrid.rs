//! SendGrid 通知送信実装
//!
//! SendGrid v3 Mail Send API（`POST /v3/mail/send`）でメールを送信する。
//! 本文は置換済みのものを送り、personalization の substitutions は使わない
//! （コメント本文中の `%...%` が SendGrid 側で再展開されるため）。

use async_trait::async_trait;
use comment_notifier_domain::notification::{
    DeliveryReceipt,
    Mailbox,
    NotificationError,
    NotificationMessage,
};
use serde::Serialize;

use super::NotificationSender;

/// SendGrid 通知送信
#[derive(Clone)]
pub struct SendGridNotificationSender {
    base_url: String,
    api_key:  String,
    client:   reqwest::Client,
}

/// Mail Send API のリクエストボディ
#[derive(Debug, Serialize)]
struct MailSendRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from:             &'a Mailbox,
    subject:          &'a str,
    content:          Vec<MailContent<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<&'a Mailbox>,
}

#[derive(Debug, Serialize)]
struct MailContent<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    value:        &'a str,
}

impl SendGridNotificationSender {
    /// 新しい SendGrid 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `base_url`: API のベース URL（例: `https://api.sendgrid.com`）
    /// - `api_key`: SendGrid API キー
    pub fn new(base_url: &str, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

/// メッセージからリクエストボディを組み立てる
fn build_request(message: &NotificationMessage) -> MailSendRequest<'_> {
    MailSendRequest {
        personalizations: vec![Personalization {
            to: vec![&message.to],
        }],
        from: &message.from,
        subject: &message.subject,
        content: vec![MailContent {
            content_type: "text/plain",
            value:        &message.body,
        }],
    }
}

#[async_trait]
impl NotificationSender for SendGridNotificationSender {
    #[tracing::instrument(skip_all, level = "debug", fields(to = %message.to))]
    async fn send_email(
        &self,
        message: &NotificationMessage,
    ) -> Result<DeliveryReceipt, NotificationError> {
        let response = self
            .client
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&build_request(message))
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SendGrid 送信失敗: {e}")))?;

        handle_send_response(response).await
    }
}

/// Mail Send API のレスポンスを送信結果に変換する
///
/// 2xx（通常は 202 Accepted）を成功とし、`X-Message-Id` ヘッダーを記録する。
async fn handle_send_response(
    response: reqwest::Response,
) -> Result<DeliveryReceipt, NotificationError> {
    let status = response.status();

    if status.is_success() {
        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        return Ok(DeliveryReceipt {
            status_code: Some(status.as_u16()),
            message_id,
        });
    }

    let body = response.text().await.unwrap_or_default();
    Err(NotificationError::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use comment_notifier_domain::{
        article::ArticleAttribute,
        comment::CommentEvent,
        notification::Substitutions,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn make_message() -> NotificationMessage {
        let event = CommentEvent::new("a1", "c1", "Al", "hi");
        let article = ArticleAttribute {
            slug:  "my-post".to_string(),
            title: "My Post".to_string(),
        };
        NotificationMessage {
            from:          Mailbox::new(Some("datsukan blog".to_string()), "from@example.com"),
            to:            Mailbox::new(None, "to@example.com"),
            subject:       "記事にコメントが投稿されました！".to_string(),
            body:          "本文".to_string(),
            substitutions: Substitutions::new(&event, &article),
        }
    }

    fn make_response(status: u16, headers: &[(&str, &str)], body: &str) -> reqwest::Response {
        let mut builder = http::Response::builder().status(status);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        reqwest::Response::from(builder.body(body.to_string()).unwrap())
    }

    #[test]
    fn test_リクエストボディがmail_send_apiの形式になる() {
        let message = make_message();

        let value = serde_json::to_value(build_request(&message)).unwrap();

        assert_eq!(
            value,
            json!({
                "personalizations": [{
                    "to": [{ "email": "to@example.com" }],
                }],
                "from": { "name": "datsukan blog", "email": "from@example.com" },
                "subject": "記事にコメントが投稿されました！",
                "content": [{ "type": "text/plain", "value": "本文" }],
            })
        );
    }

    #[tokio::test]
    async fn test_202でステータスとメッセージidを返す() {
        let response = make_response(202, &[("x-message-id", "msg-1")], "");

        let receipt = handle_send_response(response).await.unwrap();

        assert_eq!(
            receipt,
            DeliveryReceipt {
                status_code: Some(202),
                message_id:  Some("msg-1".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_401でrejectedを返す() {
        let response = make_response(401, &[], r#"{"errors":[{"message":"bad key"}]}"#);

        let result = handle_send_response(response).await;

        assert!(matches!(
            result,
            Err(NotificationError::Rejected { status: 401, body }) if body.contains("bad key")
        ));
    }

    #[tokio::test]
    async fn test_400でrejectedを返す() {
        let response = make_response(400, &[], "invalid from");

        let result = handle_send_response(response).await;

        assert!(matches!(result, Err(NotificationError::Rejected { status: 400, .. })));
    }
}
