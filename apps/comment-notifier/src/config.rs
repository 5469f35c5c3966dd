//! # Comment Notifier 設定
//!
//! 環境変数から設定を読み込む。起動時に 1 回だけ読み込み、
//! 不変の値としてパイプラインと外部クライアントに渡す。
//!
//! ## 必須チェックの範囲
//!
//! Contentful のアクセストークンとスペース ID のみ読み込み時に検証する。
//! 送信元・宛先・送信プロバイダの認証情報は検証せず、欠けていれば
//! 送信時のエラーとして表面化する。

use std::{env, fmt, str::FromStr};

use comment_notifier_shared::observability::{LogFormat, TracingConfig};
use strum::EnumString;

use crate::error::ConfigError;

const DEFAULT_FROM_NAME: &str = "datsukan blog";
const DEFAULT_BLOG_BASE_URL: &str = "https://blog.datsukan.me";
const DEFAULT_CONTENTFUL_BASE_URL: &str = "https://cdn.contentful.com";
const DEFAULT_CONTENTFUL_ENVIRONMENT: &str = "master";
const DEFAULT_SENDGRID_BASE_URL: &str = "https://api.sendgrid.com";
const DEFAULT_SMTP_HOST: &str = "localhost";
const DEFAULT_SMTP_PORT: u16 = 1025;
const DEFAULT_SQS_WAIT_TIME_SECONDS: i32 = 20;

/// Comment Notifier の設定
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// 送信元・宛先
    pub mail:          MailConfig,
    /// Contentful 接続設定
    pub contentful:    ContentfulConfig,
    /// 通知送信設定
    pub notification:  NotificationConfig,
    /// ブログのベース URL（メール内リンク用）
    pub blog_base_url: String,
}

/// 送信元・宛先の設定
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub from_address: String,
    pub from_name:    String,
    pub to_address:   String,
}

/// Contentful 接続設定
#[derive(Clone)]
pub struct ContentfulConfig {
    pub base_url:     String,
    pub space_id:     String,
    pub environment:  String,
    pub access_token: String,
}

/// 送信バックエンド
///
/// `NOTIFICATION_BACKEND` 環境変数の値（小文字）に対応する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum NotificationBackend {
    /// SendGrid Mail Send API（本番）
    SendGrid,
    /// SMTP サーバー経由
    Smtp,
    /// Amazon SES v2 経由
    Ses,
    /// 送信しない（ログ出力のみ）
    Noop,
}

/// 通知送信の設定
#[derive(Clone)]
pub struct NotificationConfig {
    pub backend:           NotificationBackend,
    pub sendgrid_base_url: String,
    /// SendGrid API キー（`SMTP_PASSWORD`）
    pub sendgrid_api_key:  String,
    /// SMTP ホスト（backend=smtp の場合に使用）
    pub smtp_host:         String,
    /// SMTP ポート（backend=smtp の場合に使用）
    pub smtp_port:         u16,
}

/// キュー消費の設定
#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub queue_url:         String,
    /// ロングポーリングの待機秒数（0〜20）
    pub wait_time_seconds: i32,
}

impl NotifierConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let contentful = ContentfulConfig {
            base_url:     or_default(&lookup, "CONTENTFUL_BASE_URL", DEFAULT_CONTENTFUL_BASE_URL),
            access_token: required(&lookup, "CONTENTFUL_ACCESS_TOKEN")?,
            space_id:     required(&lookup, "CONTENTFUL_SPACE_ID")?,
            environment:  or_default(
                &lookup,
                "CONTENTFUL_ENVIRONMENT",
                DEFAULT_CONTENTFUL_ENVIRONMENT,
            ),
        };

        let mail = MailConfig {
            from_address: lookup("MAIL_FROM").unwrap_or_default(),
            from_name:    or_default(&lookup, "MAIL_FROM_NAME", DEFAULT_FROM_NAME),
            to_address:   lookup("MAIL_TO").unwrap_or_default(),
        };

        let notification = NotificationConfig {
            backend:           parsed_or(&lookup, "NOTIFICATION_BACKEND", NotificationBackend::SendGrid)?,
            sendgrid_base_url: or_default(&lookup, "SENDGRID_BASE_URL", DEFAULT_SENDGRID_BASE_URL),
            sendgrid_api_key:  lookup("SMTP_PASSWORD").unwrap_or_default(),
            smtp_host:         or_default(&lookup, "SMTP_HOST", DEFAULT_SMTP_HOST),
            smtp_port:         parsed_or(&lookup, "SMTP_PORT", DEFAULT_SMTP_PORT)?,
        };

        Ok(Self {
            mail,
            contentful,
            notification,
            blog_base_url: or_default(&lookup, "BLOG_BASE_URL", DEFAULT_BLOG_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

impl QueueConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let wait_time_seconds =
            parsed_or(&lookup, "SQS_WAIT_TIME_SECONDS", DEFAULT_SQS_WAIT_TIME_SECONDS)?;
        if !(0..=20).contains(&wait_time_seconds) {
            return Err(ConfigError::Invalid {
                name:  "SQS_WAIT_TIME_SECONDS",
                value: wait_time_seconds.to_string(),
            });
        }

        Ok(Self {
            queue_url: required(&lookup, "SQS_QUEUE_URL")?,
            wait_time_seconds,
        })
    }
}

/// 環境変数からログ設定を読み込む
///
/// `LOG_FORMAT` は `json` / `pretty`（未設定なら `pretty`）。それ以外は `Invalid`。
pub fn load_tracing_config(service_name: &str) -> Result<TracingConfig, ConfigError> {
    tracing_config_from_lookup(service_name, |name| env::var(name).ok())
}

pub fn tracing_config_from_lookup(
    service_name: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<TracingConfig, ConfigError> {
    let log_format = parsed_or(&lookup, "LOG_FORMAT", LogFormat::default())?;
    Ok(TracingConfig::new(service_name, log_format))
}

/// 空でない値を必須とする
fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    lookup(name)
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// 未設定または空ならデフォルト値を使う
fn or_default(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    lookup(name)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// 値をパースする。未設定または空ならデフォルト値を使う
fn parsed_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name).filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

// 認証情報をログに出さないよう Debug を手動実装する

impl fmt::Debug for ContentfulConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentfulConfig")
            .field("base_url", &self.base_url)
            .field("space_id", &self.space_id)
            .field("environment", &self.environment)
            .field("access_token", &"***")
            .finish()
    }
}

impl fmt::Debug for NotificationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationConfig")
            .field("backend", &self.backend)
            .field("sendgrid_base_url", &self.sendgrid_base_url)
            .field("sendgrid_api_key", &"***")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("CONTENTFUL_ACCESS_TOKEN", "token"),
            ("CONTENTFUL_SPACE_ID", "space"),
        ]
    }

    #[test]
    fn 必須項目のみでデフォルト値が補われる() {
        let config = NotifierConfig::from_lookup(lookup_from(&minimal())).unwrap();

        assert_eq!(config.contentful.access_token, "token");
        assert_eq!(config.contentful.space_id, "space");
        assert_eq!(config.contentful.environment, "master");
        assert_eq!(config.contentful.base_url, "https://cdn.contentful.com");
        assert_eq!(config.mail.from_name, "datsukan blog");
        assert_eq!(config.mail.from_address, "");
        assert_eq!(config.notification.backend, NotificationBackend::SendGrid);
        assert_eq!(config.notification.smtp_port, 1025);
        assert_eq!(config.blog_base_url, "https://blog.datsukan.me");
    }

    #[rstest]
    #[case("CONTENTFUL_ACCESS_TOKEN")]
    #[case("CONTENTFUL_SPACE_ID")]
    fn contentfulの認証情報が無いとmissingになる(#[case] absent: &str) {
        let pairs: Vec<_> = minimal().into_iter().filter(|(k, _)| *k != absent).collect();

        let result = NotifierConfig::from_lookup(lookup_from(&pairs));

        assert!(matches!(result, Err(ConfigError::Missing(name)) if name == absent));
    }

    #[test]
    fn 空文字の認証情報は未設定として扱う() {
        let result = NotifierConfig::from_lookup(lookup_from(&[
            ("CONTENTFUL_ACCESS_TOKEN", ""),
            ("CONTENTFUL_SPACE_ID", "space"),
        ]));

        assert!(matches!(
            result,
            Err(ConfigError::Missing("CONTENTFUL_ACCESS_TOKEN"))
        ));
    }

    #[test]
    fn 送信元と宛先とapiキーは検証しない() {
        let config = NotifierConfig::from_lookup(lookup_from(&minimal())).unwrap();

        assert_eq!(config.mail.to_address, "");
        assert_eq!(config.notification.sendgrid_api_key, "");
    }

    #[rstest]
    #[case("sendgrid", NotificationBackend::SendGrid)]
    #[case("smtp", NotificationBackend::Smtp)]
    #[case("ses", NotificationBackend::Ses)]
    #[case("noop", NotificationBackend::Noop)]
    fn notification_backendを切り替えられる(
        #[case] value: &str,
        #[case] expected: NotificationBackend,
    ) {
        let mut pairs = minimal();
        pairs.push(("NOTIFICATION_BACKEND", value));

        let config = NotifierConfig::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.notification.backend, expected);
    }

    #[test]
    fn 不明なnotification_backendはinvalidになる() {
        let mut pairs = minimal();
        pairs.push(("NOTIFICATION_BACKEND", "pigeon"));

        let result = NotifierConfig::from_lookup(lookup_from(&pairs));

        assert!(matches!(
            result,
            Err(ConfigError::Invalid { name: "NOTIFICATION_BACKEND", value }) if value == "pigeon"
        ));
    }

    #[test]
    fn 不正なsmtp_portはinvalidになる() {
        let mut pairs = minimal();
        pairs.push(("SMTP_PORT", "abc"));

        let result = NotifierConfig::from_lookup(lookup_from(&pairs));

        assert!(matches!(result, Err(ConfigError::Invalid { name: "SMTP_PORT", .. })));
    }

    #[test]
    fn blog_base_urlの末尾スラッシュを除去する() {
        let mut pairs = minimal();
        pairs.push(("BLOG_BASE_URL", "https://example.com/"));

        let config = NotifierConfig::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.blog_base_url, "https://example.com");
    }

    #[test]
    fn debug出力に認証情報を含めない() {
        let mut pairs = minimal();
        pairs.push(("SMTP_PASSWORD", "SG.secret"));
        let config = NotifierConfig::from_lookup(lookup_from(&pairs)).unwrap();

        let debug = format!("{config:?}");

        assert!(!debug.contains("SG.secret"), "{debug}");
        assert!(!debug.contains("\"token\""), "{debug}");
    }

    #[test]
    fn queue_configはキューurlを必須とする() {
        let result = QueueConfig::from_lookup(lookup_from(&[]));

        assert!(matches!(result, Err(ConfigError::Missing("SQS_QUEUE_URL"))));
    }

    #[test]
    fn queue_configの待機秒数は20秒以下() {
        let result = QueueConfig::from_lookup(lookup_from(&[
            ("SQS_QUEUE_URL", "https://sqs.example.com/q"),
            ("SQS_WAIT_TIME_SECONDS", "21"),
        ]));

        assert!(matches!(
            result,
            Err(ConfigError::Invalid { name: "SQS_WAIT_TIME_SECONDS", .. })
        ));
    }

    #[rstest]
    #[case(&[], LogFormat::Pretty)]
    #[case(&[("LOG_FORMAT", "")], LogFormat::Pretty)]
    #[case(&[("LOG_FORMAT", "json")], LogFormat::Json)]
    #[case(&[("LOG_FORMAT", "pretty")], LogFormat::Pretty)]
    fn log_formatを読み込む(#[case] pairs: &[(&str, &str)], #[case] expected: LogFormat) {
        let config = tracing_config_from_lookup("comment-notifier", lookup_from(pairs)).unwrap();

        assert_eq!(config.log_format, expected);
        assert_eq!(config.service_name, "comment-notifier");
    }

    #[rstest]
    #[case("JSON")]
    #[case("text")]
    fn 不明なlog_formatはinvalidになる(#[case] value: &str) {
        let result =
            tracing_config_from_lookup("comment-notifier", lookup_from(&[("LOG_FORMAT", value)]));

        assert!(matches!(
            result,
            Err(ConfigError::Invalid { name: "LOG_FORMAT", value: v }) if v == value
        ));
    }

    #[test]
    fn queue_configのデフォルト待機秒数() {
        let config = QueueConfig::from_lookup(lookup_from(&[(
            "SQS_QUEUE_URL",
            "https://sqs.example.com/q",
        )]))
        .unwrap();

        assert_eq!(config.wait_time_seconds, 20);
    }
}
