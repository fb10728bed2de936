//! Backend endpoint wrappers
//!
//! Payloads are opaque to the client; every wrapper returns the unwrapped
//! `data` as JSON.

use reqwest::Url;
use serde_json::{json, Value};

use crate::api::pipeline::RequestPipeline;
use crate::error::{Error, Result};

/// Join path segments, percent-encoding each one.
///
/// Resource names are user input, so `/`, `?` and `#` inside them must not
/// change which endpoint is hit.
pub fn segments_path(segments: &[&str]) -> Result<String> {
    let mut url = Url::parse("http://localhost/")
        .map_err(|e| Error::Other(format!("invalid path base: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| Error::Other("path base cannot hold segments".to_string()))?
        .clear()
        .extend(segments);
    Ok(url.path().to_string())
}

// Snapshot classes

pub async fn get_volume_snapshot_classes(api: &RequestPipeline) -> Result<Value> {
    api.get("/volumesnapshotclasses").await
}

// Snapshots

/// An empty namespace lists snapshots across all namespaces
pub async fn get_volume_snapshots(api: &RequestPipeline, namespace: &str) -> Result<Value> {
    api.get_with_query("/volumesnapshots", &[("namespace", namespace)])
        .await
}

pub async fn create_volume_snapshot(api: &RequestPipeline, snapshot: &Value) -> Result<Value> {
    api.post("/volumesnapshots", snapshot).await
}

pub async fn delete_volume_snapshot(
    api: &RequestPipeline,
    namespace: &str,
    name: &str,
) -> Result<Value> {
    api.delete(&segments_path(&["volumesnapshots", namespace, name])?)
        .await
}

pub async fn force_delete_volume_snapshot(
    api: &RequestPipeline,
    namespace: &str,
    name: &str,
) -> Result<Value> {
    api.post_empty(&segments_path(&["volumesnapshots", namespace, name, "force-delete"])?)
        .await
}

pub async fn get_volume_snapshot_content(api: &RequestPipeline, name: &str) -> Result<Value> {
    api.get(&segments_path(&["volumesnapshotcontents", name])?)
        .await
}

// Volumes and cluster metadata

pub async fn get_pvcs(api: &RequestPipeline, namespace: &str) -> Result<Value> {
    api.get_with_query("/pvcs", &[("namespace", namespace)]).await
}

pub async fn get_namespaces(api: &RequestPipeline) -> Result<Value> {
    api.get("/namespaces").await
}

pub async fn get_storage_classes(api: &RequestPipeline) -> Result<Value> {
    api.get("/storageclasses").await
}

// Scheduled snapshots

pub async fn get_scheduled_snapshots(api: &RequestPipeline) -> Result<Value> {
    api.get("/scheduled-snapshots").await
}

pub async fn create_scheduled_snapshot(api: &RequestPipeline, task: &Value) -> Result<Value> {
    api.post("/scheduled-snapshots", task).await
}

pub async fn update_scheduled_snapshot(
    api: &RequestPipeline,
    id: &str,
    task: &Value,
) -> Result<Value> {
    api.put(&segments_path(&["scheduled-snapshots", id])?, task)
        .await
}

pub async fn delete_scheduled_snapshot(api: &RequestPipeline, id: &str) -> Result<Value> {
    api.delete(&segments_path(&["scheduled-snapshots", id])?)
        .await
}

pub async fn toggle_scheduled_snapshot(api: &RequestPipeline, id: &str) -> Result<Value> {
    api.post_empty(&segments_path(&["scheduled-snapshots", id, "toggle"])?)
        .await
}

// Users (admin only on the backend)

pub async fn get_all_users(api: &RequestPipeline) -> Result<Value> {
    api.get("/user/all").await
}

pub async fn delete_user(api: &RequestPipeline, username: &str) -> Result<Value> {
    api.delete(&segments_path(&["user", username])?).await
}

// Clusters

pub async fn get_clusters(api: &RequestPipeline) -> Result<Value> {
    api.get("/clusters").await
}

pub async fn get_current_cluster(api: &RequestPipeline) -> Result<Value> {
    api.get("/clusters/current").await
}

pub async fn switch_cluster(api: &RequestPipeline, cluster_name: &str) -> Result<Value> {
    api.post("/clusters/switch", &json!({ "cluster_name": cluster_name }))
        .await
}

// Ceph

pub async fn get_ceph_cluster_info(api: &RequestPipeline) -> Result<Value> {
    api.get("/ceph/cluster/info").await
}

pub async fn get_ceph_cluster_status(api: &RequestPipeline) -> Result<Value> {
    api.get("/ceph/cluster/status").await
}

pub async fn get_ceph_pools(api: &RequestPipeline) -> Result<Value> {
    api.get("/ceph/pools").await
}

pub async fn get_ceph_connection_status(api: &RequestPipeline) -> Result<Value> {
    api.get("/ceph/connection/status").await
}
