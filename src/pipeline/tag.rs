// src/pipeline/tag.rs

//! Manual relevance tagging.

use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{Field, JobAd, Site};
use crate::storage::JobStore;

/// Set the `relevant` column (0 or 1) of the stored ad `(site, id)`.
pub async fn run_tag(store: &dyn JobStore, site: Site, id: &str, relevant: u8) -> Result<JobAd> {
    let mut ad = store
        .get_ad(site.name(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("job ad {site}/{id}")))?;

    ad.set(Field::Relevant.name(), Value::from(relevant))?;
    store.update_ads(std::slice::from_ref(&ad)).await?;

    log::info!(
        "Tagged {}/{} ({}) as {}",
        site,
        id,
        ad.title.as_deref().unwrap_or_default(),
        if relevant == 1 { "relevant" } else { "not relevant" }
    );
    Ok(ad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{AdQuery, LocalStorage};

    async fn seeded_store(dir: &std::path::Path) -> LocalStorage {
        let storage = LocalStorage::new(dir);
        let ad = JobAd {
            site: Some("jobly".into()),
            searchterm: Some("analyst".into()),
            id: Some("99".into()),
            title: Some("Analyst".into()),
            url: Some("https://www.jobly.fi/tyopaikka/analyst-99".into()),
            description: Some("desc".into()),
            ..JobAd::default()
        };
        storage.store_ads(&[ad]).await.unwrap();
        storage
    }

    #[tokio::test]
    async fn test_tag_sets_relevant() {
        let tmp = tempfile::TempDir::new().unwrap();
        let storage = seeded_store(tmp.path()).await;

        let ad = run_tag(&storage, Site::Jobly, "99", 1).await.unwrap();
        assert_eq!(ad.relevant, Some(1));

        let classified = storage
            .get_ads(&AdQuery::default().classified(true))
            .await
            .unwrap();
        assert_eq!(classified.len(), 1);
        assert!(classified[0].date.is_some());
    }

    #[tokio::test]
    async fn test_tag_unknown_ad() {
        let tmp = tempfile::TempDir::new().unwrap();
        let storage = seeded_store(tmp.path()).await;

        let err = run_tag(&storage, Site::Indeed, "99", 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_tag_rejects_non_flag_value() {
        let tmp = tempfile::TempDir::new().unwrap();
        let storage = seeded_store(tmp.path()).await;

        let err = run_tag(&storage, Site::Jobly, "99", 2).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let ad = storage.get_ad("jobly", "99").await.unwrap().unwrap();
        assert!(ad.relevant.is_none());
    }
}
