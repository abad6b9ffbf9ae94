use history::persist::{KeyValueStore, sqlite_kv::SqliteKvStore};
use serde_json::json;

async fn mem_store() -> SqliteKvStore {
    SqliteKvStore::new("sqlite::memory:")
        .await
        .expect("in-memory sqlite")
}

#[tokio::test]
async fn get_on_missing_key_is_none() -> anyhow::Result<()> {
    let store = mem_store().await;

    assert!(store.get("price_history").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn set_then_get_round_trips_json() -> anyhow::Result<()> {
    let store = mem_store().await;

    let doc = json!({ "mkt-1": [{ "back": 2.5 }] });
    store.set("price_history", doc.clone()).await?;

    assert_eq!(store.get("price_history").await?, Some(doc));
    Ok(())
}

#[tokio::test]
async fn set_overwrites_existing_value() -> anyhow::Result<()> {
    let store = mem_store().await;

    store.set("k", json!(1)).await?;
    store.set("k", json!(2)).await?;

    assert_eq!(store.get("k").await?, Some(json!(2)));
    Ok(())
}

#[tokio::test]
async fn remove_deletes_the_key() -> anyhow::Result<()> {
    let store = mem_store().await;

    store.set("k", json!({"a": 1})).await?;
    store.remove("k").await?;

    assert!(store.get("k").await?.is_none());

    // Removing an absent key is not an error.
    store.remove("k").await?;
    Ok(())
}
