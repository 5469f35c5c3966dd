//! # 記事属性
//!
//! コンテンツソース（Contentful）から取得する記事のメタデータ。
//! イベントごとに毎回取得し、キャッシュや永続化はしない。

use thiserror::Error;

use crate::comment::ArticleId;

/// 記事属性
///
/// 通知メール内の記事名とリンク生成に使用する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleAttribute {
    /// URL パスに使用するスラッグ
    pub slug:  String,
    /// 記事タイトル
    pub title: String,
}

/// 記事属性の取得エラー
///
/// パイプラインからはすべてエンリッチメント失敗として扱われるが、
/// ログ調査のために原因を区別して保持する。
#[derive(Debug, Clone, Error)]
pub enum ArticleLookupError {
    /// 記事が存在しない（404）
    #[error("記事が見つかりません: {0}")]
    NotFound(ArticleId),

    /// 認証失敗（401 / 403）
    #[error("コンテンツソースの認証に失敗: {0}")]
    Unauthorized(String),

    /// 通信エラー
    #[error("ネットワークエラー: {0}")]
    Network(String),

    /// エントリの形式が想定と異なる（slug / title が無い等）
    #[error("記事エントリの形式が不正: {0}")]
    InvalidEntry(String),

    /// 予期しないエラー
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}
