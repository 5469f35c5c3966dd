//! # コメント投稿イベント
//!
//! キューから受信する「記事にコメントが投稿された」イベントを定義する。
//!
//! ## 設計方針
//!
//! - **不変**: デコード後は変更しない。処理完了（成功・失敗問わず）で破棄される
//! - **空文字の扱い**: バッチデコードでは空文字を許容する。空文字チェックは
//!   ローカル実行の引数検証（[`CommentEvent::first_empty_field`]）でのみ行う

use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

/// 記事 ID
///
/// Contentful のエントリ ID。値の形式は不透明として扱う。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(transparent)]
#[display("{_0}")]
pub struct ArticleId(String);

impl ArticleId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// コメント投稿イベント
///
/// キューのレコード 1 件に対応する。JSON のキーは snake_case。
/// 未知のフィールドは無視する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentEvent {
    /// コメントが投稿された記事の ID
    pub article_id: ArticleId,
    /// コメント ID（記事ページ内のアンカーに使用）
    pub comment_id: String,
    /// 投稿者の表示名
    pub user_name:  String,
    /// コメント本文
    pub comment:    String,
}

/// コメントイベントのフィールド
///
/// ローカル実行時の必須引数チェックで、どの引数が欠けているかを示す。
/// 宣言順がチェック順になる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display)]
pub enum CommentField {
    #[strum(to_string = "記事ID")]
    ArticleId,
    #[strum(to_string = "コメントID")]
    CommentId,
    #[strum(to_string = "表示名")]
    UserName,
    #[strum(to_string = "コメント")]
    Comment,
}

impl CommentEvent {
    pub fn new(
        article_id: impl Into<String>,
        comment_id: impl Into<String>,
        user_name: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            article_id: ArticleId::new(article_id),
            comment_id: comment_id.into(),
            user_name:  user_name.into(),
            comment:    comment.into(),
        }
    }

    /// 最初に見つかった空のフィールドを返す
    ///
    /// 記事ID → コメントID → 表示名 → コメント の順にチェックする。
    pub fn first_empty_field(&self) -> Option<CommentField> {
        if self.article_id.is_empty() {
            return Some(CommentField::ArticleId);
        }
        if self.comment_id.is_empty() {
            return Some(CommentField::CommentId);
        }
        if self.user_name.is_empty() {
            return Some(CommentField::UserName);
        }
        if self.comment.is_empty() {
            return Some(CommentField::Comment);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn jsonレコードからデシリアライズできる() {
        let json = r#"{"article_id":"a1","comment_id":"c1","user_name":"Al","comment":"hi"}"#;

        let event: CommentEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event, CommentEvent::new("a1", "c1", "Al", "hi"));
    }

    #[test]
    fn 未知のフィールドは無視される() {
        let json = r#"{"article_id":"a1","comment_id":"c1","user_name":"Al","comment":"hi","extra":1}"#;

        let result = serde_json::from_str::<CommentEvent>(json);

        assert!(result.is_ok());
    }

    #[test]
    fn 必須フィールドが欠けているとデシリアライズに失敗する() {
        let json = r#"{"article_id":"a1","comment_id":"c1","user_name":"Al"}"#;

        let result = serde_json::from_str::<CommentEvent>(json);

        assert!(result.is_err());
    }

    #[rstest]
    #[case(CommentEvent::new("", "", "", ""), Some(CommentField::ArticleId))]
    #[case(CommentEvent::new("a1", "", "", ""), Some(CommentField::CommentId))]
    #[case(CommentEvent::new("a1", "c1", "", "hi"), Some(CommentField::UserName))]
    #[case(CommentEvent::new("a1", "c1", "Al", ""), Some(CommentField::Comment))]
    #[case(CommentEvent::new("a1", "c1", "Al", "hi"), None)]
    fn first_empty_fieldは宣言順で最初の空フィールドを返す(
        #[case] event: CommentEvent,
        #[case] expected: Option<CommentField>,
    ) {
        assert_eq!(event.first_empty_field(), expected);
    }

    #[test]
    fn comment_fieldの表示名が日本語になる() {
        assert_eq!(CommentField::ArticleId.to_string(), "記事ID");
        assert_eq!(CommentField::Comment.to_string(), "コメント");
    }
}
