//! # コメント通知サービス
//!
//! 記事属性取得 → テンプレートレンダリング → メール送信を 1 イベントずつ直列に行う。
//!
//! ## 設計方針
//!
//! - **fail-fast**: バッチ内で最初に失敗したイベントで処理を打ち切り、そのエラーを返す。
//!   後続のイベントは試行しない。送信済みのイベントの取り消しは行わない
//! - **再試行しない**: 再配信はキュー側の仕組みに委ねる
//! - **依存性注入**: `ArticleAttributeFetcher` と `NotificationSender` は trait で抽象化

use std::sync::Arc;

use comment_notifier_domain::{comment::CommentEvent, notification::DeliveryReceipt};
use comment_notifier_infra::{
    content::ArticleAttributeFetcher,
    notification::NotificationSender,
};
use comment_notifier_shared::{event_log::event, log_business_event};

use super::TemplateRenderer;
use crate::{error::NotifyError, usecase::decode_batch};

/// コメント通知サービス
pub struct CommentNotificationService {
    fetcher:           Arc<dyn ArticleAttributeFetcher>,
    sender:            Arc<dyn NotificationSender>,
    template_renderer: TemplateRenderer,
}

impl CommentNotificationService {
    pub fn new(
        fetcher: Arc<dyn ArticleAttributeFetcher>,
        sender: Arc<dyn NotificationSender>,
        template_renderer: TemplateRenderer,
    ) -> Self {
        Self {
            fetcher,
            sender,
            template_renderer,
        }
    }

    /// 1 イベントを通知する
    ///
    /// 記事属性の取得に失敗した場合、送信は行わない。
    #[tracing::instrument(
        skip_all,
        fields(article_id = %event.article_id, comment_id = %event.comment_id)
    )]
    pub async fn notify(&self, event: &CommentEvent) -> Result<DeliveryReceipt, NotifyError> {
        let article = self.fetcher.fetch(&event.article_id).await?;
        tracing::debug!(slug = %article.slug, "記事属性を取得");

        let message = self.template_renderer.render(event, &article);

        match self.sender.send_email(&message).await {
            Ok(receipt) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SENT,
                    event.entity_type = event::entity_type::COMMENT,
                    event.entity_id = %event.comment_id,
                    event.result = event::result::SUCCESS,
                    notification.recipient = %message.to,
                    notification.receipt = %receipt,
                    "通知メール送信成功"
                );
                Ok(receipt)
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_FAILED,
                    event.entity_type = event::entity_type::COMMENT,
                    event.entity_id = %event.comment_id,
                    event.result = event::result::FAILURE,
                    notification.recipient = %message.to,
                    error = %e,
                    "通知メール送信失敗"
                );
                Err(e.into())
            }
        }
    }

    /// イベント列を順に通知する
    ///
    /// 最初の失敗で中断する。成功時は送信した件数を返す。
    pub async fn notify_batch(&self, events: &[CommentEvent]) -> Result<usize, NotifyError> {
        if events.is_empty() {
            return Err(NotifyError::EmptyBatch);
        }

        for event in events {
            self.notify(event).await?;
        }

        Ok(events.len())
    }

    /// 生のレコード列をデコードして通知する
    ///
    /// デコードは全件成功した場合のみ通知に進む。
    pub async fn process_records<R: AsRef<[u8]>>(&self, records: &[R]) -> Result<usize, NotifyError> {
        let events = decode_batch(records)?;
        self.notify_batch(&events).await
    }
}

#[cfg(test)]
mod tests {
    use comment_notifier_domain::{article::ArticleLookupError, notification::Mailbox};
    use comment_notifier_infra::mock::{MockArticleAttributeFetcher, MockNotificationSender};
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_service(
        fetcher: MockArticleAttributeFetcher,
        sender: MockNotificationSender,
    ) -> CommentNotificationService {
        let renderer = TemplateRenderer::new(
            "https://blog.datsukan.me",
            Mailbox::new(Some("datsukan blog".to_string()), "from@example.com"),
            Mailbox::new(None, "to@example.com"),
        );
        CommentNotificationService::new(Arc::new(fetcher), Arc::new(sender), renderer)
    }

    #[tokio::test]
    async fn 記事属性を使ってメールを送信する() {
        let fetcher = MockArticleAttributeFetcher::new();
        fetcher.add_article("a1", "my-post", "My Post");
        let sender = MockNotificationSender::new();
        let service = make_service(fetcher.clone(), sender.clone());

        let receipt = service
            .notify(&CommentEvent::new("a1", "c1", "Al", "hi"))
            .await
            .unwrap();

        assert_eq!(receipt.status_code, Some(202));
        let sent = sender.sent_messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("https://blog.datsukan.me/my-post#c1"));
        assert!(sent[0].body.contains("My Post"));
    }

    #[tokio::test]
    async fn 記事属性の取得に失敗したら送信しない() {
        let fetcher = MockArticleAttributeFetcher::new();
        fetcher.add_error("a1", ArticleLookupError::Unauthorized("bad token".to_string()));
        let sender = MockNotificationSender::new();
        let service = make_service(fetcher, sender.clone());

        let result = service
            .notify(&CommentEvent::new("a1", "c1", "Al", "hi"))
            .await;

        assert!(matches!(
            result,
            Err(NotifyError::Enrichment(ArticleLookupError::Unauthorized(_)))
        ));
        assert_eq!(sender.attempts(), 0);
    }

    #[tokio::test]
    async fn 送信失敗はdelivery_errorになる() {
        let fetcher = MockArticleAttributeFetcher::new();
        fetcher.add_article("a1", "my-post", "My Post");
        let sender = MockNotificationSender::new();
        sender.fail_for_comment("c1");
        let service = make_service(fetcher, sender.clone());

        let result = service
            .notify(&CommentEvent::new("a1", "c1", "Al", "hi"))
            .await;

        assert!(matches!(result, Err(NotifyError::Delivery(_))));
        assert_eq!(sender.attempts(), 1);
    }

    #[tokio::test]
    async fn 空のイベント列はempty_batchになる() {
        let sender = MockNotificationSender::new();
        let service = make_service(MockArticleAttributeFetcher::new(), sender.clone());

        let result = service.notify_batch(&[]).await;

        assert!(matches!(result, Err(NotifyError::EmptyBatch)));
        assert_eq!(sender.attempts(), 0);
    }

    #[tokio::test]
    async fn 不正なレコードを含むバッチは一件も送信しない() {
        let fetcher = MockArticleAttributeFetcher::new();
        fetcher.add_article("a1", "my-post", "My Post");
        let sender = MockNotificationSender::new();
        let service = make_service(fetcher.clone(), sender.clone());

        let records = [
            r#"{"article_id":"a1","comment_id":"c1","user_name":"Al","comment":"hi"}"#,
            "{}",
        ];
        let result = service.process_records(&records).await;

        assert!(matches!(result, Err(NotifyError::MalformedRecord { index: 1, .. })));
        assert!(fetcher.requested_ids().is_empty());
        assert_eq!(sender.attempts(), 0);
    }
}
