//! CLI output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use serde_json::{Map, Value};

use crate::api::Notifier;
use crate::auth::{Identity, Role, TokenInfo};
use crate::cli::OutputFormat;
use crate::router::RouteTable;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Pipeline notices rendered on the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        success(message);
    }

    fn error(&self, message: &str) {
        error(message);
    }
}

/// Format a role as a colored string
pub fn format_role(role: Role) -> String {
    match role {
        Role::Admin => role.to_string().red().bold().to_string(),
        Role::Standard => role.to_string().green().to_string(),
        Role::Readonly => role.to_string().yellow().to_string(),
    }
}

/// Print any backend payload in the requested format
pub fn print_value(value: &Value, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => print_value_table(value),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}

fn print_value_table(value: &Value) {
    match value {
        Value::Null => info("Nothing to show"),
        Value::Array(items) => print_rows(items),
        Value::Object(map) if map.values().any(|v| v.is_array() || v.is_object()) => {
            for (section, inner) in map {
                println!("{}", section.replace('_', " ").bold().underline());
                print_value_table(inner);
                println!();
            }
        }
        Value::Object(map) => print_key_values(map),
        scalar => println!("{}", scalar_text(scalar)),
    }
}

fn print_rows(items: &[Value]) {
    if items.is_empty() {
        info("No items found");
        return;
    }

    let rows: Vec<Map<String, Value>> = items.iter().map(row_fields).collect();
    let mut columns: Vec<String> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(columns.iter().map(|c| Cell::new(c).fg(Color::Cyan)));

    for row in &rows {
        table.add_row(columns.iter().map(|c| {
            Cell::new(row.get(c).map(scalar_text).unwrap_or_else(|| "-".to_string()))
        }));
    }

    println!("{table}");
}

fn print_key_values(map: &Map<String, Value>) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    for (key, value) in map {
        table.add_row(vec![Cell::new(key).fg(Color::Cyan), Cell::new(scalar_text(value))]);
    }
    println!("{table}");
}

/// Scalar columns of a row, with Kubernetes metadata pulled up to the top
fn row_fields(item: &Value) -> Map<String, Value> {
    let mut fields = Map::new();
    let Value::Object(map) = item else {
        fields.insert("value".to_string(), item.clone());
        return fields;
    };

    if let Some(Value::Object(metadata)) = map.get("metadata") {
        for key in ["name", "namespace", "creationTimestamp"] {
            if let Some(value) = metadata.get(key) {
                fields.insert(key.to_string(), value.clone());
            }
        }
    }

    for (key, value) in map {
        if !value.is_object() && !value.is_array() {
            fields.insert(key.clone(), value.clone());
        }
    }
    fields
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => (if *b { "yes" } else { "no" }).to_string(),
        other => other.to_string(),
    }
}

/// Print the route table with access requirements
pub fn print_routes(routes: &RouteTable) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Path").fg(Color::Cyan),
            Cell::new("Screen").fg(Color::Cyan),
            Cell::new("Login").fg(Color::Cyan),
            Cell::new("Admin").fg(Color::Cyan),
        ]);

    for route in routes.iter() {
        let flag = |on: bool| {
            if on {
                Cell::new("required").fg(Color::Yellow)
            } else {
                Cell::new("-")
            }
        };
        table.add_row(vec![
            Cell::new(route.path),
            Cell::new(route.title),
            flag(route.requirement.requires_auth),
            flag(route.requirement.requires_admin),
        ]);
    }

    println!("{table}");
}

/// Print the current identity and what the token claims about itself
pub fn print_identity(identity: &Identity, token: Option<&TokenInfo>) {
    println!("{}", "Session".bold().underline());
    println!();
    println!("  {} {}", "User:".bold(), identity.username);
    println!("  {} {}", "Role:".bold(), format_role(identity.role));

    if let Some(token) = token {
        if let Some(issued) = token.issued_at() {
            println!("  {} {}", "Issued:".bold(), issued.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        if let Some(expires) = token.expires_at() {
            let text = expires.format("%Y-%m-%d %H:%M:%S UTC").to_string();
            let text = if token.is_expired() {
                format!("{} (expired)", text).red().to_string()
            } else {
                text
            };
            println!("  {} {}", "Expires:".bold(), text);
        }
    }
}

/// Confirm an action with the user
pub fn confirm(message: &str) -> anyhow::Result<bool> {
    Ok(dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()?)
}
