//! # ロギング初期化
//!
//! `tracing-subscriber` の登録をまとめる。
//!
//! 出力形式と `RUST_LOG` 未設定時のフィルタは [`TracingConfig`] で受け取る。
//! `LOG_FORMAT` など環境変数の解釈はアプリケーションの設定層が行い、
//! 不正な値はほかの設定エラーと同じ経路で報告される。

use strum::EnumString;

/// ログ出力形式
///
/// `LOG_FORMAT` の値（小文字）に対応する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    /// 1 行 1 JSON（集約基盤向け）
    Json,
    /// 人が読む形式（ローカル実行向け）
    #[default]
    Pretty,
}

/// トレーシング初期化設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// サービス名（`app` スパンの `service` フィールド）
    pub service_name:   String,
    pub log_format:     LogFormat,
    /// `RUST_LOG` が未設定のときに使うフィルタ
    pub default_filter: String,
}

impl TracingConfig {
    /// サービス名から既定フィルタ `info,<crate 名>=debug` を組み立てる
    ///
    /// crate 名はサービス名の `-` を `_` に置き換えたもの。ターゲットの前方一致で
    /// 効くため、同じ接頭辞を持つワークスペース内の crate もまとめて debug になる。
    pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        let service_name = service_name.into();
        let default_filter = format!("info,{}=debug", service_name.replace('-', "_"));

        Self {
            service_name,
            log_format,
            default_filter,
        }
    }
}

/// グローバル subscriber を登録する
///
/// `tracing_error::ErrorLayer` も登録するので、`InfraError` は生成時点の
/// SpanTrace を保持でき、`?err` で出力したときに呼び出し経路が残る。
///
/// 2 回目以降の呼び出しは panic する（`SubscriberInitExt::init` の仕様）。
#[cfg(feature = "observability")]
pub fn init_tracing(config: &TracingConfig) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer(config.log_format))
        .with(tracing_error::ErrorLayer::default())
        .init();
}

#[cfg(feature = "observability")]
fn fmt_layer<S>(format: LogFormat) -> Box<dyn tracing_subscriber::Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    use tracing_subscriber::{Layer as _, fmt};

    match format {
        // イベントのフィールドをトップレベルに展開し、jq で `.["event.kind"]` のように引けるようにする
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => fmt::layer().boxed(),
    }
}
