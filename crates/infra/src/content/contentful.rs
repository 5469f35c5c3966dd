//! Contentful 記事属性取得実装
//!
//! Content Delivery API のエントリ取得エンドポイントを呼び出す:
//! `GET {base_url}/spaces/{space_id}/environments/{environment}/entries/{entry_id}`

use async_trait::async_trait;
use comment_notifier_domain::{
    article::{ArticleAttribute, ArticleLookupError},
    comment::ArticleId,
};
use serde::Deserialize;
use url::Url;

use super::ArticleAttributeFetcher;

/// Contentful クライアント
#[derive(Clone)]
pub struct ContentfulClient {
    base_url:     String,
    space_id:     String,
    environment:  String,
    access_token: String,
    client:       reqwest::Client,
}

/// エントリ取得レスポンス（必要なフィールドのみ）
#[derive(Debug, Deserialize)]
struct EntryResponse {
    fields: EntryFields,
}

#[derive(Debug, Deserialize)]
struct EntryFields {
    slug:  Option<String>,
    title: Option<String>,
}

impl ContentfulClient {
    /// 新しい Contentful クライアントを作成する
    ///
    /// # 引数
    ///
    /// - `base_url`: API のベース URL（例: `https://cdn.contentful.com`）
    /// - `space_id`: スペース ID
    /// - `environment`: 環境名（例: `master`）
    /// - `access_token`: Content Delivery API のアクセストークン
    pub fn new(base_url: &str, space_id: &str, environment: &str, access_token: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            space_id: space_id.to_string(),
            environment: environment.to_string(),
            access_token,
            client: reqwest::Client::new(),
        }
    }

    /// エントリ取得 URL を組み立てる
    ///
    /// パスセグメントはエンコードされるため、記事 ID に `/` 等が含まれても
    /// 別のパスを指すことはない。
    fn entry_url(&self, article_id: &ArticleId) -> Result<Url, ArticleLookupError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ArticleLookupError::Unexpected(format!("ベース URL が不正: {}: {e}", self.base_url))
        })?;

        url.path_segments_mut()
            .map_err(|()| {
                ArticleLookupError::Unexpected(format!(
                    "ベース URL にパスを追加できません: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend([
                "spaces",
                &self.space_id,
                "environments",
                &self.environment,
                "entries",
                article_id.as_str(),
            ]);

        Ok(url)
    }
}

#[async_trait]
impl ArticleAttributeFetcher for ContentfulClient {
    #[tracing::instrument(skip_all, level = "debug", fields(%article_id))]
    async fn fetch(&self, article_id: &ArticleId) -> Result<ArticleAttribute, ArticleLookupError> {
        let url = self.entry_url(article_id)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| ArticleLookupError::Network(e.to_string()))?;

        handle_entry_response(response, article_id).await
    }
}

/// エントリ取得レスポンスを記事属性に変換する
///
/// - 2xx: `fields.slug` と `fields.title` を取り出す（どちらも文字列必須）
/// - 404: `NotFound`
/// - 401 / 403: `Unauthorized`
/// - その他: `Unexpected`
async fn handle_entry_response(
    response: reqwest::Response,
    article_id: &ArticleId,
) -> Result<ArticleAttribute, ArticleLookupError> {
    let status = response.status();

    if status.is_success() {
        let body = response
            .text()
            .await
            .map_err(|e| ArticleLookupError::Network(e.to_string()))?;
        return parse_entry(&body);
    }

    let body = response.text().await.unwrap_or_default();

    let error = match status {
        reqwest::StatusCode::NOT_FOUND => ArticleLookupError::NotFound(article_id.clone()),
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            ArticleLookupError::Unauthorized(body)
        }
        _ => ArticleLookupError::Unexpected(format!("予期しないステータス {status}: {body}")),
    };

    Err(error)
}

fn parse_entry(body: &str) -> Result<ArticleAttribute, ArticleLookupError> {
    let entry: EntryResponse = serde_json::from_str(body)
        .map_err(|e| ArticleLookupError::InvalidEntry(e.to_string()))?;

    let slug = entry
        .fields
        .slug
        .ok_or_else(|| ArticleLookupError::InvalidEntry("fields.slug がありません".to_string()))?;
    let title = entry
        .fields
        .title
        .ok_or_else(|| ArticleLookupError::InvalidEntry("fields.title がありません".to_string()))?;

    Ok(ArticleAttribute { slug, title })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// テスト用の HTTP レスポンスを構築する
    fn make_response(status: u16, body: &str) -> reqwest::Response {
        let http_resp = http::Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(body.to_string())
            .unwrap();
        reqwest::Response::from(http_resp)
    }

    fn article_id() -> ArticleId {
        ArticleId::new("a1")
    }

    #[test]
    fn test_entry_urlがスペースと環境とエントリidを含む() {
        let client = ContentfulClient::new(
            "https://cdn.contentful.com/",
            "space1",
            "master",
            "token".to_string(),
        );

        let url = client.entry_url(&article_id()).unwrap();

        assert_eq!(
            url.as_str(),
            "https://cdn.contentful.com/spaces/space1/environments/master/entries/a1"
        );
    }

    #[test]
    fn test_entry_urlは記事idのスラッシュをエンコードする() {
        let client =
            ContentfulClient::new("https://cdn.contentful.com", "s", "master", "t".to_string());

        let url = client.entry_url(&ArticleId::new("../x")).unwrap();

        assert!(url.as_str().ends_with("/entries/..%2Fx"), "{url}");
    }

    #[tokio::test]
    async fn test_成功レスポンスからslugとtitleを取り出す() {
        let body = r#"{"sys":{"id":"a1"},"fields":{"slug":"my-post","title":"My Post","body":"..."}}"#;
        let response = make_response(200, body);

        let result = handle_entry_response(response, &article_id()).await.unwrap();

        assert_eq!(
            result,
            ArticleAttribute {
                slug:  "my-post".to_string(),
                title: "My Post".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_slugが無いとinvalid_entryを返す() {
        let response = make_response(200, r#"{"fields":{"title":"My Post"}}"#);

        let result = handle_entry_response(response, &article_id()).await;

        assert!(matches!(result, Err(ArticleLookupError::InvalidEntry(msg)) if msg.contains("slug")));
    }

    #[tokio::test]
    async fn test_titleが文字列でないとinvalid_entryを返す() {
        let response = make_response(200, r#"{"fields":{"slug":"s","title":1}}"#);

        let result = handle_entry_response(response, &article_id()).await;

        assert!(matches!(result, Err(ArticleLookupError::InvalidEntry(_))));
    }

    #[tokio::test]
    async fn test_不正なjsonでinvalid_entryを返す() {
        let response = make_response(200, "not json");

        let result = handle_entry_response(response, &article_id()).await;

        assert!(matches!(result, Err(ArticleLookupError::InvalidEntry(_))));
    }

    #[tokio::test]
    async fn test_404でnot_foundを返す() {
        let response = make_response(404, r#"{"sys":{"id":"NotFound"}}"#);

        let result = handle_entry_response(response, &article_id()).await;

        assert!(matches!(result, Err(ArticleLookupError::NotFound(id)) if id == article_id()));
    }

    #[tokio::test]
    async fn test_401でunauthorizedを返す() {
        let response = make_response(401, "access token invalid");

        let result = handle_entry_response(response, &article_id()).await;

        assert!(matches!(
            result,
            Err(ArticleLookupError::Unauthorized(body)) if body == "access token invalid"
        ));
    }

    #[tokio::test]
    async fn test_500でunexpectedを返す() {
        let response = make_response(500, "server error");

        let result = handle_entry_response(response, &article_id()).await;

        match result {
            Err(ArticleLookupError::Unexpected(msg)) => {
                assert!(msg.contains("500"), "メッセージにステータスコードが含まれること: {msg}");
                assert!(msg.contains("server error"), "メッセージにボディが含まれること: {msg}");
            }
            other => panic!("Unexpected を期待したが {other:?} を受け取った"),
        }
    }
}
