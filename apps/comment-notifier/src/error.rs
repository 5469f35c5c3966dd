//! # Comment Notifier エラー定義
//!
//! 通知パイプラインで発生するエラーと、設定読み込みエラーを定義する。
//!
//! ## 設計方針
//!
//! - **すべて終端エラー**: どのエラーも内部で再試行しない。バッチは最初のエラーで中断する
//! - **そのまま伝播**: 外部サービスのエラーは対応するバリアントに包むだけで、
//!   汎用エラーへの変換や握りつぶしはしない

use comment_notifier_domain::{
    article::ArticleLookupError,
    comment::CommentField,
    notification::NotificationError,
};
use comment_notifier_shared::event_log::error::{category, kind};
use thiserror::Error;

/// 通知パイプラインで発生するエラー
#[derive(Debug, Error)]
pub enum NotifyError {
    /// バッチにレコードが 1 件も無い
    #[error("リクエスト内容が存在しません（空のバッチ）")]
    EmptyBatch,

    /// レコードを期待する形にデコードできない
    #[error("レコード {index} のデコードに失敗: {source}")]
    MalformedRecord {
        /// バッチ内の位置（0 始まり）
        index:  usize,
        #[source]
        source: serde_json::Error,
    },

    /// 必須設定が欠けている
    #[error("設定エラー: {0}")]
    Configuration(#[from] ConfigError),

    /// 記事属性の取得に失敗
    #[error("記事属性の取得に失敗: {0}")]
    Enrichment(#[from] ArticleLookupError),

    /// メール送信に失敗
    #[error("通知の配信に失敗: {0}")]
    Delivery(#[from] NotificationError),

    /// ローカル実行で必須引数が空
    #[error("ローカル実行だが{0}指定が無いので処理不可能")]
    MissingArgument(CommentField),
}

impl NotifyError {
    /// ログに付ける `(error.category, error.kind)` を返す
    pub fn log_context(&self) -> (&'static str, &'static str) {
        match self {
            Self::EmptyBatch | Self::MalformedRecord { .. } => (category::INPUT, kind::DECODE),
            Self::MissingArgument(_) => (category::INPUT, kind::ARGUMENT),
            Self::Configuration(_) => (category::INFRASTRUCTURE, kind::CONFIGURATION),
            Self::Enrichment(_) => (category::EXTERNAL_SERVICE, kind::CONTENT_SOURCE),
            Self::Delivery(_) => (category::EXTERNAL_SERVICE, kind::DELIVERY),
        }
    }
}

/// 設定読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 必須の環境変数が未設定または空
    #[error("環境変数が設定されていません: {0}")]
    Missing(&'static str),

    /// 環境変数の値が不正
    #[error("環境変数 {name} の値が不正: {value:?}")]
    Invalid { name: &'static str, value: String },
}
