//! CLI command implementations

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::api::endpoints;
use crate::app::App;
use crate::auth::{service, Role, TokenInfo};
use crate::cli::{
    confirm, info, print_identity, print_routes, print_value, success, warn, CephAction,
    ClusterAction, ConsoleNotifier, GlobalArgs, OutputFormat, ScheduledAction, SnapshotAction,
    UserAction,
};
use crate::config::{self, loader::CONFIG_FILENAME, Config};
use crate::router::{Decision, DASHBOARD_PATH, LOGIN_PATH};

/// Initialize a new snapconsole.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = Path::new(CONFIG_FILENAME);

    if config_path.exists() {
        warn(&format!("{} already exists", CONFIG_FILENAME));
        return Ok(());
    }

    fs::write(config_path, config::loader::default_config_content())?;

    success(&format!("Created {}", CONFIG_FILENAME));
    info("Set [api] base_url and run 'snapconsole login'");
    Ok(())
}

pub async fn login(
    global: &GlobalArgs,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let app = build_app(global)?;

    // A stored session that still validates makes the login screen redirect away
    if app.session().restore_from_snapshot().await {
        app.session().validate_remotely().await;
    }
    let navigation = app.router().navigate(LOGIN_PATH).await;
    if navigation.decision == Decision::RedirectDefault {
        if let Some(identity) = app.session().current_identity().await {
            info(&format!("Already logged in as {}", identity.username));
        }
        return Ok(());
    }

    let username = match username {
        Some(username) => username,
        None => dialoguer::Input::<String>::new()
            .with_prompt("Username")
            .interact_text()?,
    };
    let password = match password {
        Some(password) => password,
        None => dialoguer::Password::new().with_prompt("Password").interact()?,
    };

    let identity = service::login(app.api(), &username, &password).await?;
    app.router().navigate(&app.config().ui.default_route).await;
    info(&format!("Signed in as {} ({})", identity.username, identity.role));
    Ok(())
}

pub async fn logout(global: &GlobalArgs) -> Result<()> {
    let app = build_app(global)?;
    service::logout(app.api()).await;
    Ok(())
}

pub async fn register(
    global: &GlobalArgs,
    username: &str,
    role: &str,
    password: Option<String>,
) -> Result<()> {
    let app = build_app(global)?;
    let role: Role = role.parse()?;

    let password = match password {
        Some(password) => password,
        None => dialoguer::Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?,
    };

    service::register(app.api(), username, &password, role).await?;
    Ok(())
}

/// Restore and validate the stored session, then show who it belongs to
pub async fn whoami(global: &GlobalArgs) -> Result<()> {
    let app = build_app(global)?;
    app.require(DASHBOARD_PATH).await?;

    let identity = app
        .session()
        .current_identity()
        .await
        .context("session has no identity")?;
    let token = app
        .session()
        .credential()
        .await
        .and_then(|credential| TokenInfo::inspect(&credential));

    match global.format {
        OutputFormat::Table => print_identity(&identity, token.as_ref()),
        format => print_value(&serde_json::to_value(&identity)?, format)?,
    }
    Ok(())
}

pub async fn passwd(global: &GlobalArgs) -> Result<()> {
    let app = build_app(global)?;
    app.require(DASHBOARD_PATH).await?;

    let old_password = dialoguer::Password::new()
        .with_prompt("Current password")
        .interact()?;
    let new_password = dialoguer::Password::new()
        .with_prompt("New password")
        .with_confirmation("Confirm new password", "Passwords do not match")
        .interact()?;

    service::change_password(app.api(), &old_password, &new_password).await?;
    Ok(())
}

/// Open a screen the way the browser console would
pub async fn open(global: &GlobalArgs, path: &str) -> Result<()> {
    let app = build_app(global)?;
    let view = app.open(path).await?;

    match view.navigation.decision {
        Decision::Admit => {}
        Decision::RedirectLogin => {
            warn("Login required. Run 'snapconsole login' first.");
            return Ok(());
        }
        Decision::RedirectDefault => {
            info(&format!(
                "Redirected from {} to {}",
                view.navigation.target, view.navigation.location
            ));
            return Ok(());
        }
    }

    if matches!(global.format, OutputFormat::Table) {
        info(&format!("{} ({})", view.title, view.navigation.location));
    }
    if let Some(data) = &view.data {
        print_value(data, global.format)?;
    }
    Ok(())
}

pub async fn routes(global: &GlobalArgs) -> Result<()> {
    let app = build_app(global)?;
    match global.format {
        OutputFormat::Table => print_routes(app.router().routes()),
        format => {
            let routes: Vec<_> = app.router().routes().iter().collect();
            print_value(&serde_json::to_value(routes)?, format)?;
        }
    }
    Ok(())
}

pub async fn snapshots(global: &GlobalArgs, action: SnapshotAction) -> Result<()> {
    let app = build_app(global)?;
    app.require("/snapshots").await?;
    let api = app.api();

    match action {
        SnapshotAction::List { namespace } => {
            let data = endpoints::get_volume_snapshots(api, &namespace).await?;
            print_value(&data, global.format)?;
        }
        SnapshotAction::Create { file } => {
            let request = read_json(&file)?;
            endpoints::create_volume_snapshot(api, &request).await?;
            success("Snapshot created");
        }
        SnapshotAction::Delete {
            namespace,
            name,
            force,
            yes,
        } => {
            if !yes && !confirm(&format!("Delete snapshot {}/{}?", namespace, name))? {
                info("Cancelled");
                return Ok(());
            }
            if force {
                endpoints::force_delete_volume_snapshot(api, &namespace, &name).await?;
            } else {
                endpoints::delete_volume_snapshot(api, &namespace, &name).await?;
            }
            success(&format!("Deleted snapshot {}/{}", namespace, name));
        }
        SnapshotAction::Content { name } => {
            let data = endpoints::get_volume_snapshot_content(api, &name).await?;
            print_value(&data, global.format)?;
        }
    }
    Ok(())
}

pub async fn snapshot_classes(global: &GlobalArgs) -> Result<()> {
    let app = build_app(global)?;
    app.require("/snapshot-classes").await?;
    let data = endpoints::get_volume_snapshot_classes(app.api()).await?;
    print_value(&data, global.format)
}

pub async fn pvcs(global: &GlobalArgs, namespace: &str) -> Result<()> {
    let app = build_app(global)?;
    app.require("/pvcs").await?;
    let data = endpoints::get_pvcs(app.api(), namespace).await?;
    print_value(&data, global.format)
}

pub async fn namespaces(global: &GlobalArgs) -> Result<()> {
    let app = build_app(global)?;
    app.require("/pvcs").await?;
    let data = endpoints::get_namespaces(app.api()).await?;
    print_value(&data, global.format)
}

pub async fn storage_classes(global: &GlobalArgs) -> Result<()> {
    let app = build_app(global)?;
    app.require("/pvcs").await?;
    let data = endpoints::get_storage_classes(app.api()).await?;
    print_value(&data, global.format)
}

pub async fn scheduled(global: &GlobalArgs, action: ScheduledAction) -> Result<()> {
    let app = build_app(global)?;
    app.require("/scheduled").await?;
    let api = app.api();

    match action {
        ScheduledAction::List => {
            let data = endpoints::get_scheduled_snapshots(api).await?;
            print_value(&data, global.format)?;
        }
        ScheduledAction::Create { file } => {
            let task = read_json(&file)?;
            endpoints::create_scheduled_snapshot(api, &task).await?;
            success("Scheduled task created");
        }
        ScheduledAction::Update { id, file } => {
            let task = read_json(&file)?;
            endpoints::update_scheduled_snapshot(api, &id, &task).await?;
            success(&format!("Updated scheduled task {}", id));
        }
        ScheduledAction::Toggle { id } => {
            endpoints::toggle_scheduled_snapshot(api, &id).await?;
            success(&format!("Toggled scheduled task {}", id));
        }
        ScheduledAction::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete scheduled task {}?", id))? {
                info("Cancelled");
                return Ok(());
            }
            endpoints::delete_scheduled_snapshot(api, &id).await?;
            success(&format!("Deleted scheduled task {}", id));
        }
    }
    Ok(())
}

pub async fn clusters(global: &GlobalArgs, action: ClusterAction) -> Result<()> {
    let app = build_app(global)?;
    app.require("/clusters").await?;
    let api = app.api();

    match action {
        ClusterAction::List => {
            print_value(&endpoints::get_clusters(api).await?, global.format)?;
        }
        ClusterAction::Current => {
            print_value(&endpoints::get_current_cluster(api).await?, global.format)?;
        }
        ClusterAction::Switch { name } => {
            endpoints::switch_cluster(api, &name).await?;
            success(&format!("Switched to cluster {}", name));
        }
    }
    Ok(())
}

pub async fn users(global: &GlobalArgs, action: UserAction) -> Result<()> {
    let app = build_app(global)?;
    app.require("/users").await?;
    let api = app.api();

    match action {
        UserAction::List => {
            print_value(&endpoints::get_all_users(api).await?, global.format)?;
        }
        UserAction::Delete { username, yes } => {
            if !yes && !confirm(&format!("Delete user '{}'?", username))? {
                info("Cancelled");
                return Ok(());
            }
            endpoints::delete_user(api, &username).await?;
            success(&format!("Deleted user {}", username));
        }
    }
    Ok(())
}

pub async fn ceph(global: &GlobalArgs, action: CephAction) -> Result<()> {
    let app = build_app(global)?;
    app.require("/ceph").await?;
    let api = app.api();

    let data = match action {
        CephAction::Info => endpoints::get_ceph_cluster_info(api).await?,
        CephAction::Status => endpoints::get_ceph_cluster_status(api).await?,
        CephAction::Pools => endpoints::get_ceph_pools(api).await?,
        CephAction::Connection => endpoints::get_ceph_connection_status(api).await?,
    };
    print_value(&data, global.format)
}

// Helper functions

/// Config file values, overridden by flags and environment
fn load_config(global: &GlobalArgs) -> Result<Config> {
    let mut config = config::load_config_or_default().map_err(|e| anyhow::anyhow!("{}", e))?;
    if let Some(url) = &global.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(dir) = &global.storage_dir {
        config.storage.dir = dir.clone();
    }
    Ok(config)
}

fn build_app(global: &GlobalArgs) -> Result<App> {
    let config = load_config(global)?;
    App::new(config, Arc::new(ConsoleNotifier)).map_err(|e| anyhow::anyhow!("{}", e))
}

fn read_json(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}
