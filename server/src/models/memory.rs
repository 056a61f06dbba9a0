use std::collections::HashMap;
use std::sync::Arc;

use axum::async_trait;
use tokio::sync::RwLock;
use validator::Validate;

use common::error::ApiResult;
use common::request::cep::ReqUpdateCep;

use crate::models::cep::{now, sort_newest_first, validate_batch, CepFilter, CepRecord};
use crate::models::{not_found, CepStore};

/// 内存存储, 进程重启后数据丢失
///
/// A replacement map is built off-lock and swapped in under a single write
/// lock, so a reader sees either the old set or the new one.
#[derive(Debug, Clone, Default)]
pub struct MemoryCepStore {
    inner: Arc<RwLock<HashMap<String, CepRecord>>>,
}

impl MemoryCepStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[async_trait]
impl CepStore for MemoryCepStore {
    async fn list(&self, filter: CepFilter) -> ApiResult<Vec<CepRecord>> {
        let mut records = self
            .inner
            .read()
            .await
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect::<Vec<CepRecord>>();
        sort_newest_first(&mut records);

        Ok(records)
    }

    async fn get(&self, code: &str) -> ApiResult<CepRecord> {
        self.inner
            .read()
            .await
            .get(code)
            .cloned()
            .ok_or_else(|| not_found(code))
    }

    async fn replace_all(&self, records: Vec<CepRecord>) -> ApiResult<()> {
        validate_batch(&records)?;

        let fresh = records
            .into_iter()
            .map(|record| (record.code.clone(), record))
            .collect::<HashMap<String, CepRecord>>();

        *self.inner.write().await = fresh;
        Ok(())
    }

    async fn update(&self, code: &str, info: ReqUpdateCep) -> ApiResult<CepRecord> {
        info.validate()?;

        let mut lock = self.inner.write().await;
        let record = lock.get_mut(code).ok_or_else(|| not_found(code))?;
        if let Some(street) = info.street {
            record.street = street;
        }
        if let Some(neighborhood) = info.neighborhood {
            record.neighborhood = neighborhood;
        }
        record.updated_at = now();

        Ok(record.clone())
    }

    async fn toggle_favorite(&self, code: &str) -> ApiResult<CepRecord> {
        let mut lock = self.inner.write().await;
        let record = lock.get_mut(code).ok_or_else(|| not_found(code))?;
        record.favorite = !record.favorite;
        record.updated_at = now();

        Ok(record.clone())
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use chrono::Duration;

    use common::error::ApiError;

    use super::*;
    use crate::models::cep::test::sample;

    async fn seeded(codes: &[&str]) -> MemoryCepStore {
        let store = MemoryCepStore::new();
        store
            .replace_all(codes.iter().map(|code| sample(code)).collect())
            .await
            .unwrap();
        store
    }

    fn codes(records: &[CepRecord]) -> BTreeSet<String> {
        records.iter().map(|r| r.code.clone()).collect()
    }

    #[tokio::test]
    async fn replace_all_then_list_returns_exactly_the_batch() {
        let store = seeded(&["90000-001", "90000-002", "90000-003"]).await;

        let batch = vec![sample("91420-270"), sample("91410-000")];
        store.replace_all(batch.clone()).await.unwrap();

        let mut listed = store.list(CepFilter::default()).await.unwrap();
        listed.sort_by(|a, b| a.code.cmp(&b.code));
        let mut expected = batch;
        expected.sort_by(|a, b| a.code.cmp(&b.code));
        assert_eq!(listed, expected);
    }

    #[tokio::test]
    async fn replace_all_with_empty_batch_empties_the_store() {
        let store = seeded(&["91420-270"]).await;

        store.replace_all(Vec::new()).await.unwrap();

        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn failed_replace_keeps_prior_contents() {
        let store = seeded(&["91420-270", "91410-000"]).await;
        let before = store.list(CepFilter::default()).await.unwrap();

        let mut broken = sample("91000-000");
        broken.city = String::new();
        let err = store
            .replace_all(vec![sample("92000-000"), broken])
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(store.list(CepFilter::default()).await.unwrap(), before);
    }

    #[tokio::test]
    async fn list_is_newest_created_first() {
        let mut older = sample("91410-000");
        older.created_at = older.created_at - Duration::minutes(5);
        let newer = sample("91420-270");

        let store = MemoryCepStore::new();
        store.replace_all(vec![older, newer]).await.unwrap();

        let listed = store.list(CepFilter::default()).await.unwrap();
        assert_eq!(listed[0].code, "91420-270");
        assert_eq!(listed[1].code, "91410-000");
    }

    #[tokio::test]
    async fn get_unknown_code_is_not_found() {
        let store = seeded(&["91420-270"]).await;

        assert_eq!(
            store.get("00000-000").await.unwrap_err(),
            ApiError::NotFound("CEP 00000-000 not found".to_string())
        );
    }

    #[tokio::test]
    async fn toggle_twice_restores_favorite() {
        let store = seeded(&["91420-270"]).await;

        let once = store.toggle_favorite("91420-270").await.unwrap();
        assert!(once.favorite);

        let twice = store.toggle_favorite("91420-270").await.unwrap();
        assert!(!twice.favorite);
    }

    #[tokio::test]
    async fn toggled_record_is_the_only_favorite() {
        let store = seeded(&["91420-270", "91410-000"]).await;

        let record = store.toggle_favorite("91420-270").await.unwrap();
        assert!(record.favorite);

        let favorites = store.list(CepFilter::favorite(true)).await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].code, "91420-270");
    }

    #[tokio::test]
    async fn favorite_filters_partition_the_listing() {
        let store = seeded(&["91420-270", "91410-000", "91420-000"]).await;
        store.toggle_favorite("91410-000").await.unwrap();

        let all = store.list(CepFilter::default()).await.unwrap();
        let favorites = store.list(CepFilter::favorite(true)).await.unwrap();
        let others = store.list(CepFilter::favorite(false)).await.unwrap();

        assert!(favorites.iter().all(|r| r.favorite));
        assert!(others.iter().all(|r| !r.favorite));
        assert_eq!(favorites.len() + others.len(), all.len());

        let union = codes(&favorites)
            .union(&codes(&others))
            .cloned()
            .collect::<BTreeSet<String>>();
        assert_eq!(union, codes(&all));
    }

    #[tokio::test]
    async fn update_changes_only_street() {
        let store = seeded(&["91420-270"]).await;
        let before = store.toggle_favorite("91420-270").await.unwrap();

        let after = store
            .update(
                "91420-270",
                ReqUpdateCep {
                    street: Some("Nova Rua São Domingos".to_string()),
                    neighborhood: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(after.street, "Nova Rua São Domingos");
        assert_eq!(
            CepRecord {
                street: before.street.clone(),
                updated_at: before.updated_at,
                ..after.clone()
            },
            before
        );
        assert_eq!(store.get("91420-270").await.unwrap(), after);
    }

    #[tokio::test]
    async fn update_rejects_empty_value_and_keeps_record() {
        let store = seeded(&["91420-270"]).await;
        let before = store.get("91420-270").await.unwrap();

        let err = store
            .update(
                "91420-270",
                ReqUpdateCep {
                    street: None,
                    neighborhood: Some(String::new()),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(store.get("91420-270").await.unwrap(), before);
    }

    #[tokio::test]
    async fn update_unknown_code_is_not_found_and_store_unchanged() {
        let store = seeded(&["91420-270", "91410-000"]).await;
        let before = store.list(CepFilter::default()).await.unwrap();

        let err = store
            .update(
                "00000-000",
                ReqUpdateCep {
                    street: Some("Rua Nova".to_string()),
                    neighborhood: Some("Centro".to_string()),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(store.list(CepFilter::default()).await.unwrap(), before);
    }
}
