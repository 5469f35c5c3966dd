//! # Comment Notifier
//!
//! ブログ記事へのコメント投稿イベントを受け取り、記事情報を付与した
//! 通知メールを管理者へ送る。
//!
//! ## 実行モード
//!
//! - **キューモード**（デフォルト）: SQS をロングポーリングし、受信したバッチを通知する
//! - **ローカルモード**（`--local`）: コマンドライン引数の 1 件を通知する
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `CONTENTFUL_ACCESS_TOKEN` | **Yes** | Contentful のアクセストークン |
//! | `CONTENTFUL_SPACE_ID` | **Yes** | Contentful のスペース ID |
//! | `MAIL_FROM` / `MAIL_TO` | No | 送信元・宛先アドレス |
//! | `SMTP_PASSWORD` | No | SendGrid API キー |
//! | `NOTIFICATION_BACKEND` | No | `sendgrid` / `smtp` / `ses` / `noop`（デフォルト: `sendgrid`） |
//! | `SQS_QUEUE_URL` | キューモードのみ | 消費するキューの URL |
//! | `LOG_FORMAT` | No | `json` / `pretty` |
//!
//! ## 起動方法
//!
//! ```bash
//! # ローカル実行
//! cargo run -p comment-notifier -- --local \
//!     --article-id 1a2b3c --comment-id c1 --user-name Al --comment "hi"
//!
//! # キューを 1 回だけポーリング
//! SQS_QUEUE_URL=https://sqs... cargo run -p comment-notifier -- --once
//! ```

use std::{process::ExitCode, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use comment_notifier::{
    config::{
        NotificationBackend,
        NotificationConfig,
        NotifierConfig,
        QueueConfig,
        load_tracing_config,
    },
    error::NotifyError,
    handler::{LocalArgs, PollOutcome, QueueWorker, run_local},
    usecase::{CommentNotificationService, TemplateRenderer},
};
use comment_notifier_domain::notification::Mailbox;
use comment_notifier_infra::{
    content::ContentfulClient,
    notification::{
        NoopNotificationSender,
        NotificationSender,
        SendGridNotificationSender,
        SesNotificationSender,
        SmtpNotificationSender,
    },
    queue::SqsMessageQueue,
};
use comment_notifier_shared::observability::init_tracing;
use tracing::Instrument as _;

/// コマンドライン引数
#[derive(Debug, Parser)]
#[command(version, about = "記事へのコメント投稿を通知メールで知らせる")]
struct Cli {
    /// ローカル実行（引数の 1 件を通知する）
    #[arg(long)]
    local: bool,

    #[command(flatten)]
    args: LocalArgs,

    /// キューを 1 回だけポーリングして終了する
    #[arg(long)]
    once: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let tracing_config =
        load_tracing_config("comment-notifier").context("ログ設定の読み込みに失敗しました")?;
    init_tracing(&tracing_config);
    let span = tracing::info_span!("app", service = %tracing_config.service_name);

    if cli.local {
        Ok(local_main(cli.args).instrument(span).await)
    } else {
        queue_main(cli.once).instrument(span).await
    }
}

/// ローカルモード
///
/// 失敗時はエラーメッセージを標準出力に出して終了コード 1 を返す。
async fn local_main(args: LocalArgs) -> ExitCode {
    println!("local");

    let result = run_local(args, || async {
        let config = NotifierConfig::from_env()?;
        Ok::<_, NotifyError>(Arc::new(build_service(&config).await))
    })
    .await;

    match result {
        Ok(receipt) => {
            println!("{receipt}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let (category, kind) = e.log_context();
            tracing::error!(error.category = category, error.kind = kind, "ローカル実行に失敗: {e}");
            println!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// キューモード
async fn queue_main(once: bool) -> anyhow::Result<ExitCode> {
    let config = NotifierConfig::from_env().context("設定の読み込みに失敗しました")?;
    let queue_config = QueueConfig::from_env().context("キュー設定の読み込みに失敗しました")?;

    let sdk_config = aws_config::load_from_env().await;
    let queue = SqsMessageQueue::new(
        aws_sdk_sqs::Client::new(&sdk_config),
        queue_config.queue_url.clone(),
        queue_config.wait_time_seconds,
    );
    let service = Arc::new(build_service(&config).await);
    let worker = QueueWorker::new(Arc::new(queue), service);

    tracing::info!(
        queue_url = %queue_config.queue_url,
        backend = %config.notification.backend,
        "キューの消費を開始します"
    );

    if once {
        return match worker.poll_once().await {
            Ok(PollOutcome::Idle) => {
                tracing::info!("メッセージはありませんでした");
                Ok(ExitCode::SUCCESS)
            }
            Ok(PollOutcome::Delivered(count)) => {
                tracing::info!(count, "バッチを通知しました");
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                e.log("バッチの処理に失敗");
                Err(e).context("バッチの処理に失敗しました")
            }
        };
    }

    worker.run(shutdown_signal()).await;
    tracing::info!("キューの消費を停止しました");
    Ok(ExitCode::SUCCESS)
}

/// 設定から通知サービスを組み立てる
async fn build_service(config: &NotifierConfig) -> CommentNotificationService {
    let fetcher = ContentfulClient::new(
        &config.contentful.base_url,
        &config.contentful.space_id,
        &config.contentful.environment,
        config.contentful.access_token.clone(),
    );
    let sender = build_sender(&config.notification).await;
    let renderer = TemplateRenderer::new(
        &config.blog_base_url,
        Mailbox::new(
            Some(config.mail.from_name.clone()),
            config.mail.from_address.clone(),
        ),
        Mailbox::new(None, config.mail.to_address.clone()),
    );

    CommentNotificationService::new(Arc::new(fetcher), sender, renderer)
}

/// 送信バックエンドを選択する
async fn build_sender(config: &NotificationConfig) -> Arc<dyn NotificationSender> {
    tracing::debug!(backend = %config.backend, "送信バックエンドを初期化");

    match config.backend {
        NotificationBackend::SendGrid => Arc::new(SendGridNotificationSender::new(
            &config.sendgrid_base_url,
            config.sendgrid_api_key.clone(),
        )),
        NotificationBackend::Smtp => Arc::new(SmtpNotificationSender::new(
            &config.smtp_host,
            config.smtp_port,
        )),
        NotificationBackend::Ses => {
            let sdk_config = aws_config::load_from_env().await;
            Arc::new(SesNotificationSender::new(aws_sdk_sesv2::Client::new(
                &sdk_config,
            )))
        }
        NotificationBackend::Noop => Arc::new(NoopNotificationSender),
    }
}

/// Ctrl-C または SIGTERM を待つ
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Ctrl-C ハンドラの登録に失敗: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("SIGTERM ハンドラの登録に失敗: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
