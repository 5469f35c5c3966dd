//! # テスト用モック
//!
//! ユースケーステストで使用するインメモリモック。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! comment-notifier-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use comment_notifier_domain::{
    article::{ArticleAttribute, ArticleLookupError},
    comment::ArticleId,
    notification::{DeliveryReceipt, NotificationError, NotificationMessage},
};

use crate::{
    content::ArticleAttributeFetcher,
    error::InfraError,
    notification::NotificationSender,
    queue::{MessageQueue, QueueMessage},
};

// ===== MockArticleAttributeFetcher =====

/// 登録された記事のみ返すモック。未登録の記事 ID は `NotFound` になる。
#[derive(Clone, Default)]
pub struct MockArticleAttributeFetcher {
    articles:  Arc<Mutex<HashMap<ArticleId, Result<ArticleAttribute, ArticleLookupError>>>>,
    requested: Arc<Mutex<Vec<ArticleId>>>,
}

impl MockArticleAttributeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_article(&self, article_id: &str, slug: &str, title: &str) {
        self.articles.lock().unwrap().insert(
            ArticleId::new(article_id),
            Ok(ArticleAttribute {
                slug:  slug.to_string(),
                title: title.to_string(),
            }),
        );
    }

    pub fn add_error(&self, article_id: &str, error: ArticleLookupError) {
        self.articles
            .lock()
            .unwrap()
            .insert(ArticleId::new(article_id), Err(error));
    }

    /// fetch が呼ばれた記事 ID（呼び出し順）
    pub fn requested_ids(&self) -> Vec<ArticleId> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArticleAttributeFetcher for MockArticleAttributeFetcher {
    async fn fetch(&self, article_id: &ArticleId) -> Result<ArticleAttribute, ArticleLookupError> {
        self.requested.lock().unwrap().push(article_id.clone());
        self.articles
            .lock()
            .unwrap()
            .get(article_id)
            .cloned()
            .unwrap_or_else(|| Err(ArticleLookupError::NotFound(article_id.clone())))
    }
}

// ===== MockNotificationSender =====

/// 送信メッセージを記録するモック
///
/// `fail_for_comment` で指定したコメント ID のメッセージは `Rejected` で失敗する。
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent:             Arc<Mutex<Vec<NotificationMessage>>>,
    attempts:         Arc<Mutex<usize>>,
    failing_comments: Arc<Mutex<Vec<String>>>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for_comment(&self, comment_id: &str) {
        self.failing_comments
            .lock()
            .unwrap()
            .push(comment_id.to_string());
    }

    /// 送信に成功したメッセージ
    pub fn sent_messages(&self) -> Vec<NotificationMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// 送信を試みた回数（失敗を含む）
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(
        &self,
        message: &NotificationMessage,
    ) -> Result<DeliveryReceipt, NotificationError> {
        *self.attempts.lock().unwrap() += 1;

        let comment_id = &message.substitutions.comment_id;
        if self.failing_comments.lock().unwrap().contains(comment_id) {
            return Err(NotificationError::Rejected {
                status: 500,
                body:   format!("mock failure: {comment_id}"),
            });
        }

        self.sent.lock().unwrap().push(message.clone());
        Ok(DeliveryReceipt {
            status_code: Some(202),
            message_id:  Some(format!("mock-{comment_id}")),
        })
    }
}

// ===== MockMessageQueue =====

/// 事前に積んだバッチを順に返すモック
///
/// `fail_acknowledge` 以降の ACK は記録されず `Queue` エラーになる。
#[derive(Clone, Default)]
pub struct MockMessageQueue {
    batches:          Arc<Mutex<VecDeque<Vec<QueueMessage>>>>,
    acknowledged:     Arc<Mutex<Vec<QueueMessage>>>,
    fail_acknowledge: Arc<Mutex<bool>>,
}

impl MockMessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 本文のリストからバッチを積む。ID は `m-{n}`、receipt handle は `rh-{n}`
    pub fn push_batch(&self, bodies: &[&str]) {
        let batch = bodies
            .iter()
            .enumerate()
            .map(|(index, body)| QueueMessage {
                message_id:     format!("m-{index}"),
                receipt_handle: format!("rh-{index}"),
                body:           (*body).to_string(),
            })
            .collect();
        self.batches.lock().unwrap().push_back(batch);
    }

    pub fn fail_acknowledge(&self) {
        *self.fail_acknowledge.lock().unwrap() = true;
    }

    /// ACK されたメッセージ
    pub fn acknowledged(&self) -> Vec<QueueMessage> {
        self.acknowledged.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageQueue for MockMessageQueue {
    async fn receive(&self) -> Result<Vec<QueueMessage>, InfraError> {
        Ok(self.batches.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn acknowledge(&self, messages: &[QueueMessage]) -> Result<(), InfraError> {
        if *self.fail_acknowledge.lock().unwrap() {
            return Err(InfraError::queue("mock acknowledge failure"));
        }
        self.acknowledged
            .lock()
            .unwrap()
            .extend_from_slice(messages);
        Ok(())
    }
}
