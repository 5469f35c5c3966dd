//! # テンプレートレンダラー
//!
//! 固定テンプレートのプレースホルダを置換し、通知メールを生成する。
//!
//! ## 設計方針
//!
//! - **件名は固定**: `記事にコメントが投稿されました！`
//! - **本文は 2 ブロック**: 記事名とコメントへのリンク、表示名とコメント本文を空行で連結
//! - **リンク**: `{blog_base_url}/{slug}#{comment_id}`

use comment_notifier_domain::{
    article::ArticleAttribute,
    comment::CommentEvent,
    notification::{Mailbox, NotificationMessage, Substitutions},
};

/// 通知メールの件名
pub const SUBJECT: &str = "記事にコメントが投稿されました！";

/// 本文の後半（表示名とコメント）
const DETAIL_TEMPLATE: &str =
    "[表示名]\n%userName%\n\n[コメント]\n%comment%\n\n記事にコメントが投稿されました！";

/// テンプレートレンダラー
///
/// 送信元・宛先とブログのベース URL を保持し、コメントイベントと記事属性から
/// [`NotificationMessage`] を生成する。
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    body_template: String,
    from:          Mailbox,
    to:            Mailbox,
}

impl TemplateRenderer {
    /// 新しいレンダラーを作成する
    ///
    /// # 引数
    ///
    /// - `blog_base_url`: ブログのベース URL（例: `https://blog.datsukan.me`）
    /// - `from`: 送信元
    /// - `to`: 宛先
    pub fn new(blog_base_url: &str, from: Mailbox, to: Mailbox) -> Self {
        let blog_base_url = blog_base_url.trim_end_matches('/');
        let header = format!("記事名：%articleTitle%\n{blog_base_url}/%articleSlug%#%commentId%");

        Self {
            body_template: format!("{header}\n\n{DETAIL_TEMPLATE}"),
            from,
            to,
        }
    }

    /// 通知メッセージを生成する
    pub fn render(&self, event: &CommentEvent, article: &ArticleAttribute) -> NotificationMessage {
        let substitutions = Substitutions::new(event, article);

        NotificationMessage {
            from: self.from.clone(),
            to: self.to.clone(),
            subject: SUBJECT.to_string(),
            body: substitutions.apply(&self.body_template),
            substitutions,
        }
    }
}
