//! # バッチデコーダー
//!
//! キューから受け取ったレコード列を [`CommentEvent`] の列に変換する。
//!
//! - 0 件なら `EmptyBatch`
//! - 1 件でも形式不正なら `MalformedRecord`（全件失敗、部分的な結果は返さない）
//! - 空文字の値は許容する（空文字チェックはローカル実行でのみ行う）

use comment_notifier_domain::comment::CommentEvent;

use crate::error::NotifyError;

/// レコード列をデコードする
///
/// 出力の順序は入力と同じ。
pub fn decode_batch<R: AsRef<[u8]>>(records: &[R]) -> Result<Vec<CommentEvent>, NotifyError> {
    if records.is_empty() {
        return Err(NotifyError::EmptyBatch);
    }

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_slice(record.as_ref())
                .map_err(|source| NotifyError::MalformedRecord { index, source })
        })
        .collect()
}
