//! 通知テストビルダー
//!
//! テストコードの重複を削減するためのビルダーパターン実装。
//! 標準的な送信元・宛先とモックのセットアップを提供する。

use std::sync::Arc;

use comment_notifier_domain::notification::Mailbox;
use comment_notifier_infra::mock::{
    MockArticleAttributeFetcher,
    MockMessageQueue,
    MockNotificationSender,
};

use crate::{
    handler::QueueWorker,
    usecase::{CommentNotificationService, TemplateRenderer},
};

/// 通知テストのセットアップデータ
///
/// NotifierTestBuilder が生成する SUT と Mock のセット。
/// Mock は内部状態を共有しているため、SUT 実行後に送信内容を検査できる。
pub struct NotifierTestSetup {
    pub sut:     Arc<CommentNotificationService>,
    pub fetcher: MockArticleAttributeFetcher,
    pub sender:  MockNotificationSender,
}

/// 通知テストビルダー
///
/// # 使用例
///
/// ```ignore
/// use comment_notifier::test_utils::NotifierTestBuilder;
///
/// #[tokio::test]
/// async fn test_example() {
///     let setup = NotifierTestBuilder::new()
///         .with_article("a1", "my-post", "My Post")
///         .build();
///
///     setup.sut.notify_batch(&events).await.unwrap();
///     assert_eq!(setup.sender.sent_messages().len(), 1);
/// }
/// ```
pub struct NotifierTestBuilder {
    blog_base_url: String,
    from:          Mailbox,
    to:            Mailbox,
    fetcher:       MockArticleAttributeFetcher,
    sender:        MockNotificationSender,
}

impl Default for NotifierTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifierTestBuilder {
    pub fn new() -> Self {
        Self {
            blog_base_url: "https://blog.datsukan.me".to_string(),
            from:          Mailbox::new(Some("datsukan blog".to_string()), "from@example.com"),
            to:            Mailbox::new(None, "to@example.com"),
            fetcher:       MockArticleAttributeFetcher::new(),
            sender:        MockNotificationSender::new(),
        }
    }

    pub fn blog_base_url(mut self, url: &str) -> Self {
        self.blog_base_url = url.to_string();
        self
    }

    /// 記事属性を登録する
    pub fn with_article(self, article_id: &str, slug: &str, title: &str) -> Self {
        self.fetcher.add_article(article_id, slug, title);
        self
    }

    /// 指定したコメント ID の送信を失敗させる
    pub fn failing_comment(self, comment_id: &str) -> Self {
        self.sender.fail_for_comment(comment_id);
        self
    }

    pub fn build(self) -> NotifierTestSetup {
        let renderer = TemplateRenderer::new(&self.blog_base_url, self.from, self.to);
        let sut = CommentNotificationService::new(
            Arc::new(self.fetcher.clone()),
            Arc::new(self.sender.clone()),
            renderer,
        );

        NotifierTestSetup {
            sut: Arc::new(sut),
            fetcher: self.fetcher,
            sender: self.sender,
        }
    }

    /// キューワーカーとモックキューを組み立てる
    pub fn build_worker(self) -> (QueueWorker, MockMessageQueue, NotifierTestSetup) {
        let setup = self.build();
        let queue = MockMessageQueue::new();
        let worker = QueueWorker::new(Arc::new(queue.clone()), setup.sut.clone());

        (worker, queue, setup)
    }
}
