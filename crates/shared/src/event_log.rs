//! # 構造化ログのフィールド規約
//!
//! 通知の成否とキューの ACK 判断を、JSON ログから後で追えるようにするための
//! マクロと定数をまとめる。
//!
//! - 業務上の出来事（通知した・ACK した等）は [`log_business_event!`] で出す。
//!   `event.kind = "business_event"` が付くので、
//!   `jq 'select(.["event.kind"] == "business_event")'` で抽出できる
//! - 失敗は `tracing::error!` に `error.category` と `error.kind` を付けて出す。
//!   値は [`error`] の定数を使う
//!
//! フィールド名はドット区切り（`event.action` 等）。JSON 出力では
//! `flatten_event` によりそのままトップレベルのキーになる。

/// 業務イベントを `info` レベルで出力する
///
/// 呼び出し側で `event.category` / `event.action` / `event.result` を必ず指定し、
/// 対象があれば `event.entity_type` / `event.entity_id` も付ける。
///
/// ```ignore
/// log_business_event!(
///     event.category = event::category::NOTIFICATION,
///     event.action = event::action::NOTIFICATION_SENT,
///     event.entity_type = event::entity_type::COMMENT,
///     event.entity_id = %comment_id,
///     event.result = event::result::SUCCESS,
///     "通知メール送信成功"
/// );
/// ```
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// `event.*` フィールドの値
pub mod event {
    pub mod category {
        pub const NOTIFICATION: &str = "notification";
        pub const QUEUE: &str = "queue";
    }

    pub mod action {
        /// コメント 1 件分の通知メールを送った / 送れなかった
        pub const NOTIFICATION_SENT: &str = "notification.sent";
        pub const NOTIFICATION_FAILED: &str = "notification.failed";

        /// バッチを削除した / 削除せず再配信に回した
        pub const BATCH_ACKNOWLEDGED: &str = "batch.acknowledged";
        pub const BATCH_REJECTED: &str = "batch.rejected";
    }

    pub mod entity_type {
        pub const COMMENT: &str = "comment";
        /// キューから 1 回で受信したメッセージの組
        pub const BATCH: &str = "batch";
    }

    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// `error.*` フィールドの値
pub mod error {
    /// どこで失敗したか
    pub mod category {
        /// キューや実行環境
        pub const INFRASTRUCTURE: &str = "infrastructure";
        /// Contentful・メール送信プロバイダ
        pub const EXTERNAL_SERVICE: &str = "external_service";
        /// レコードや引数の内容
        pub const INPUT: &str = "input";
    }

    /// 何が失敗したか
    pub mod kind {
        pub const QUEUE: &str = "queue";
        pub const CONTENT_SOURCE: &str = "content_source";
        pub const DELIVERY: &str = "delivery";
        pub const DECODE: &str = "decode";
        pub const ARGUMENT: &str = "argument";
        pub const CONFIGURATION: &str = "configuration";
    }
}
