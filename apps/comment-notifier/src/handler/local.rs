//! # ローカル実行アダプタ
//!
//! コマンドライン引数で渡された 4 つの値から通知を 1 件送る。
//! 値の検証は設定読み込みや外部呼び出しより前に行う。

use std::{future::Future, sync::Arc};

use clap::Args;
use comment_notifier_domain::{comment::CommentEvent, notification::DeliveryReceipt};

use crate::{error::NotifyError, usecase::CommentNotificationService};

/// ローカル実行の引数
#[derive(Debug, Clone, Default, Args)]
pub struct LocalArgs {
    /// 記事 ID
    #[arg(long, default_value = "")]
    pub article_id: String,

    /// コメント ID
    #[arg(long, default_value = "")]
    pub comment_id: String,

    /// 表示名
    #[arg(long, default_value = "")]
    pub user_name: String,

    /// コメント本文
    #[arg(long, default_value = "")]
    pub comment: String,
}

impl LocalArgs {
    /// 引数を検証してイベントに変換する
    ///
    /// 記事 ID → コメント ID → 表示名 → コメントの順に確認し、
    /// 最初に見つかった空の項目を `MissingArgument` として返す。
    pub fn into_event(self) -> Result<CommentEvent, NotifyError> {
        let event = CommentEvent::new(self.article_id, self.comment_id, self.user_name, self.comment);

        match event.first_empty_field() {
            Some(field) => Err(NotifyError::MissingArgument(field)),
            None => Ok(event),
        }
    }
}

/// 引数を検証し、通過した場合のみサービスを組み立てて 1 件通知する
///
/// `build` は検証に失敗した場合は呼ばれない。設定読み込みもここで行う想定。
pub async fn run_local<F, Fut>(args: LocalArgs, build: F) -> Result<DeliveryReceipt, NotifyError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Arc<CommentNotificationService>, NotifyError>>,
{
    let event = args.into_event()?;
    let service = build().await?;

    tracing::info!(article_id = %event.article_id, comment_id = %event.comment_id, "ローカル実行");

    service.notify(&event).await
}
