//! # 起動アダプタ
//!
//! 通知パイプラインを呼び出す入口を定義する。
//!
//! ## 設計方針
//!
//! - **薄いアダプタ**: 入力の取得と結果の扱いだけを担当し、通知処理は
//!   [`CommentNotificationService`](crate::usecase::CommentNotificationService) に委譲
//! - `local`: コマンドライン引数から 1 件のイベントを組み立てて通知する
//! - `queue`: キューをロングポーリングし、受信したバッチを通知する

pub mod local;
pub mod queue;

pub use local::{LocalArgs, run_local};
pub use queue::{PollOutcome, QueueWorker, WorkerError};
