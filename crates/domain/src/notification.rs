//! # 通知
//!
//! コメント投稿通知メールに関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 |
//! |---|------------|
//! | [`NotificationMessage`] | 送信可能な状態までレンダリングされた通知メール |
//! | [`Placeholder`] | テンプレート内の置換対象トークン（`%articleSlug%` 等） |
//! | [`Substitutions`] | 5 つのプレースホルダすべてに対する置換値 |
//! | [`DeliveryReceipt`] | 送信プロバイダが返したステータス |
//!
//! ## 設計方針
//!
//! - **置換値は型で全件束縛**: [`Substitutions`] は 5 フィールドすべてを持つため、
//!   未束縛のプレースホルダは構築できない
//! - **1 パス置換**: 挿入した値は再スキャンしない。コメント本文に `%comment%` のような
//!   文字列が含まれていても二重置換は起きない

use std::{fmt, str::FromStr};

use serde::Serialize;
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use thiserror::Error;

use crate::{article::ArticleAttribute, comment::CommentEvent};

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// 通信失敗・メッセージ構築失敗など、プロバイダに届かなかった
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// プロバイダが送信を拒否した
    #[error("メール送信がプロバイダに拒否されました（status: {status}）: {body}")]
    Rejected { status: u16, body: String },

    /// メールアドレスが不正
    #[error("メールアドレスが不正: {0}")]
    InvalidAddress(String),
}

/// テンプレートのプレースホルダ
///
/// トークンは `%` で名前を囲んだ形式（例: `%articleSlug%`）。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumString,
    IntoStaticStr,
    strum::Display,
)]
#[strum(serialize_all = "camelCase")]
pub enum Placeholder {
    ArticleSlug,
    ArticleTitle,
    CommentId,
    UserName,
    Comment,
}

impl Placeholder {
    /// テンプレート内で使うトークン文字列を返す
    pub fn token(self) -> String {
        format!("%{self}%")
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

/// プレースホルダの置換値
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Substitutions {
    pub article_slug:  String,
    pub article_title: String,
    pub comment_id:    String,
    pub user_name:     String,
    pub comment:       String,
}

impl Substitutions {
    /// コメントイベントと記事属性から置換値を組み立てる
    pub fn new(event: &CommentEvent, article: &ArticleAttribute) -> Self {
        Self {
            article_slug:  article.slug.clone(),
            article_title: article.title.clone(),
            comment_id:    event.comment_id.clone(),
            user_name:     event.user_name.clone(),
            comment:       event.comment.clone(),
        }
    }

    pub fn get(&self, placeholder: Placeholder) -> &str {
        match placeholder {
            Placeholder::ArticleSlug => &self.article_slug,
            Placeholder::ArticleTitle => &self.article_title,
            Placeholder::CommentId => &self.comment_id,
            Placeholder::UserName => &self.user_name,
            Placeholder::Comment => &self.comment,
        }
    }

    /// (プレースホルダ, 値) の組を宣言順に返す
    pub fn iter(&self) -> impl Iterator<Item = (Placeholder, &str)> {
        Placeholder::all().map(|p| (p, self.get(p)))
    }

    /// テンプレート中のプレースホルダをすべて置換する
    ///
    /// 左から 1 回だけ走査する。`%` で囲まれた名前が既知のプレースホルダで
    /// なければ、そのまま文字列として残す。
    pub fn apply(&self, template: &str) -> String {
        let mut rendered = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('%') {
            rendered.push_str(&rest[..start]);
            let after = &rest[start + 1..];

            let matched = after.find('%').and_then(|end| {
                Placeholder::from_str(&after[..end])
                    .ok()
                    .map(|placeholder| (placeholder, end))
            });

            match matched {
                Some((placeholder, end)) => {
                    rendered.push_str(self.get(placeholder));
                    rest = &after[end + 1..];
                }
                None => {
                    rendered.push('%');
                    rest = after;
                }
            }
        }

        rendered.push_str(rest);
        rendered
    }
}

/// メールの送信元・宛先
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mailbox {
    /// 表示名（省略可）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name:    Option<String>,
    #[serde(rename = "email")]
    pub address: String,
}

impl Mailbox {
    pub fn new(name: Option<String>, address: impl Into<String>) -> Self {
        Self {
            name,
            address: address.into(),
        }
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} <{}>", self.address),
            None => f.write_str(&self.address),
        }
    }
}

/// 通知メッセージ
///
/// テンプレートレンダリングの出力。`NotificationSender` に渡され、送信後は保持しない。
#[derive(Debug, Clone)]
pub struct NotificationMessage {
    pub from:          Mailbox,
    pub to:            Mailbox,
    pub subject:       String,
    /// 置換済みのプレーンテキスト本文
    pub body:          String,
    /// サーバー側置換に対応するプロバイダ向けに保持する置換値
    pub substitutions: Substitutions,
}

/// 送信結果
///
/// プロバイダが返したステータス。ログ出力にのみ使用する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// HTTP ステータスコード（HTTP API 経由の場合）
    pub status_code: Option<u16>,
    /// プロバイダのメッセージ ID
    pub message_id:  Option<String>,
}

impl fmt::Display for DeliveryReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status_code, &self.message_id) {
            (Some(status), Some(id)) => write!(f, "status={status} message_id={id}"),
            (Some(status), None) => write!(f, "status={status}"),
            (None, Some(id)) => write!(f, "message_id={id}"),
            (None, None) => f.write_str("accepted"),
        }
    }
}
