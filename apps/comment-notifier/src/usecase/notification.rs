//! # 通知ユースケース
//!
//! 記事属性の取得、通知メールの生成・送信を統合する。
//!
//! ## モジュール構成
//!
//! - [`template_renderer`] - 固定テンプレートとプレースホルダ置換によるメール生成
//! - [`service`] - 記事属性取得 + レンダリング + 送信の統合サービス

pub mod service;
pub mod template_renderer;

pub use service::CommentNotificationService;
pub use template_renderer::TemplateRenderer;
