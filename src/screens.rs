//! Data each screen loads once it has been admitted

use serde_json::{Map, Value};

use crate::api::{endpoints, RequestPipeline};
use crate::error::Result;
use crate::router::Screen;

const DEFAULT_PVC_NAMESPACE: &str = "default";

/// Fetch everything `screen` displays.
///
/// Sections are fetched in order and the first failure aborts the load; a 401
/// part-way through has already cleared the session by the time it returns.
pub async fn load(screen: Screen, api: &RequestPipeline) -> Result<Value> {
    let mut sections = Map::new();

    match screen {
        Screen::Login => return Ok(Value::Null),
        Screen::Dashboard => {
            sections.insert("current_cluster".into(), endpoints::get_current_cluster(api).await?);
            sections.insert(
                "snapshot_classes".into(),
                endpoints::get_volume_snapshot_classes(api).await?,
            );
            sections.insert("snapshots".into(), endpoints::get_volume_snapshots(api, "").await?);
            sections.insert(
                "scheduled_snapshots".into(),
                endpoints::get_scheduled_snapshots(api).await?,
            );
        }
        Screen::SnapshotClasses => {
            sections.insert(
                "snapshot_classes".into(),
                endpoints::get_volume_snapshot_classes(api).await?,
            );
        }
        Screen::Snapshots => {
            sections.insert("namespaces".into(), endpoints::get_namespaces(api).await?);
            sections.insert("snapshots".into(), endpoints::get_volume_snapshots(api, "").await?);
        }
        Screen::ScheduledTasks => {
            sections.insert(
                "scheduled_snapshots".into(),
                endpoints::get_scheduled_snapshots(api).await?,
            );
        }
        Screen::Pvcs => {
            sections.insert("namespaces".into(), endpoints::get_namespaces(api).await?);
            sections.insert("storage_classes".into(), endpoints::get_storage_classes(api).await?);
            sections.insert(
                "pvcs".into(),
                endpoints::get_pvcs(api, DEFAULT_PVC_NAMESPACE).await?,
            );
        }
        Screen::CephCluster => {
            sections.insert(
                "connection".into(),
                endpoints::get_ceph_connection_status(api).await?,
            );
            sections.insert("cluster".into(), endpoints::get_ceph_cluster_info(api).await?);
        }
        Screen::UserManagement => {
            sections.insert("users".into(), endpoints::get_all_users(api).await?);
        }
        Screen::ClusterManagement => {
            sections.insert("clusters".into(), endpoints::get_clusters(api).await?);
            sections.insert("current_cluster".into(), endpoints::get_current_cluster(api).await?);
        }
    }

    Ok(Value::Object(sections))
}
