//! # 通知送信
//!
//! メール通知の送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **4 つの実装**: SendGrid（本番用）、SMTP（ローカル SMTP サーバー用）、SES、Noop（ログのみ）
//! - **環境変数切替**: `NOTIFICATION_BACKEND` でランタイム選択

mod noop;
mod sendgrid;
mod ses;
mod smtp;

use async_trait::async_trait;
use comment_notifier_domain::notification::{
    DeliveryReceipt,
    NotificationError,
    NotificationMessage,
};
pub use noop::NoopNotificationSender;
pub use sendgrid::SendGridNotificationSender;
pub use ses::SesNotificationSender;
pub use smtp::SmtpNotificationSender;

/// メール送信トレイト
///
/// 通知基盤の中核。メール送信の具体的な方法を抽象化する。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信し、プロバイダのステータスを返す
    async fn send_email(
        &self,
        message: &NotificationMessage,
    ) -> Result<DeliveryReceipt, NotificationError>;
}
