//! # Comment Notifier ドメイン層
//!
//! ブログ記事へのコメント投稿を通知メールに変換するためのドメインモデルを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! app → infra → domain
//! ```
//!
//! ドメイン層は外部サービス（Contentful、メール送信プロバイダ、キュー）に
//! 一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`comment`] - コメント投稿イベント
//! - [`article`] - 記事属性（スラッグ・タイトル）と取得エラー
//! - [`notification`] - 通知メッセージ、プレースホルダ置換、送信エラー

pub mod article;
pub mod comment;
pub mod notification;
