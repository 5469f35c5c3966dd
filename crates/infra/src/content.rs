//! # コンテンツソース
//!
//! 記事 ID から記事属性（スラッグ・タイトル）を取得する。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `ArticleAttributeFetcher` trait で CMS を抽象化
//! - **キャッシュしない**: イベントごとに毎回取得する
//! - **認証情報はクライアントが保持**: 呼び出し側は記事 ID だけを渡す

mod contentful;

use async_trait::async_trait;
use comment_notifier_domain::{
    article::{ArticleAttribute, ArticleLookupError},
    comment::ArticleId,
};
pub use contentful::ContentfulClient;

/// 記事属性取得トレイト
#[async_trait]
pub trait ArticleAttributeFetcher: Send + Sync {
    /// 記事属性を取得する
    async fn fetch(&self, article_id: &ArticleId) -> Result<ArticleAttribute, ArticleLookupError>;
}
