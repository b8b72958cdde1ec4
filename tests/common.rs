//! Common test utilities for building workflow documents and patches.
use serde_json::{Value, json};
use shuusei::prelude::*;
use std::path::PathBuf;

/// A dashboard workflow: a webhook, a data-preparation code node and an HTML
/// generator whose `jsCode` carries chart options and CSS.
#[allow(dead_code)]
pub fn dashboard_value() -> Value {
    json!({
        "name": "06 Web Dashboard",
        "nodes": [
            {
                "parameters": { "path": "dashboard", "responseMode": "responseNode" },
                "id": "webhook",
                "name": "Webhook",
                "type": "n8n-nodes-base.webhook",
                "typeVersion": 2,
                "position": [240, 300]
            },
            {
                "parameters": {
                    "jsCode": "const defaultData = {\n  heating_state: 0,\n  mist_state: 0,\n};\nreturn defaultData;"
                },
                "id": "prepare-data",
                "name": "Подготовить Данные",
                "type": "n8n-nodes-base.code",
                "typeVersion": 2,
                "position": [460, 300]
            },
            {
                "parameters": {
                    "jsCode": "const options = {\n  responsive: true,\n  maintainAspectRatio: true,\n};\nconst css = `.chart-display {\n  height: 500px;\n}`;"
                },
                "id": "render-html",
                "name": "Генерация HTML",
                "type": "n8n-nodes-base.code",
                "typeVersion": 2,
                "position": [680, 300]
            }
        ],
        "connections": {
            "Webhook": { "main": [[{ "node": "Подготовить Данные", "type": "main", "index": 0 }]] },
            "Подготовить Данные": { "main": [[{ "node": "Генерация HTML", "type": "main", "index": 0 }]] }
        },
        "settings": { "executionOrder": "v1" },
        "active": false
    })
}

#[allow(dead_code)]
pub fn dashboard() -> Workflow {
    Workflow::from_value(dashboard_value()).expect("dashboard fixture is a valid workflow")
}

/// A migration workflow with numbered steps chained through `connections`.
#[allow(dead_code)]
pub fn migrations_value() -> Value {
    json!({
        "name": "Database Migrations",
        "nodes": [
            { "id": "start", "name": "Start", "type": "n8n-nodes-base.manualTrigger", "position": [240, 300], "parameters": {} },
            { "id": "m1", "name": "1. Создать watering_settings", "type": "n8n-nodes-base.postgres", "position": [460, 300], "parameters": { "query": "CREATE TABLE watering_settings ();" } },
            { "id": "m2", "name": "2. Создать watering_notifications", "type": "n8n-nodes-base.postgres", "position": [680, 300], "parameters": { "query": "CREATE TABLE watering_notifications ();" } },
            { "id": "m3", "name": "3. Добавить esp32_connection_lost", "type": "n8n-nodes-base.postgres", "position": [900, 300], "parameters": { "query": "INSERT INTO telegram_alert_states VALUES ('esp32_connection_lost');" } },
            { "id": "verify-migrations", "name": "4. Проверить Результаты", "type": "n8n-nodes-base.postgres", "position": [900, 300], "parameters": { "query": "SELECT 1;" } },
            { "id": "format-results", "name": "Форматировать Результаты", "type": "n8n-nodes-base.code", "position": [1120, 300], "parameters": { "jsCode": "return items;" } }
        ],
        "connections": {
            "Start": { "main": [[{ "node": "1. Создать watering_settings", "type": "main", "index": 0 }]] },
            "1. Создать watering_settings": { "main": [[{ "node": "2. Создать watering_notifications", "type": "main", "index": 0 }]] },
            "2. Создать watering_notifications": { "main": [[{ "node": "3. Добавить esp32_connection_lost", "type": "main", "index": 0 }]] },
            "3. Добавить esp32_connection_lost": { "main": [[{ "node": "4. Проверить Результаты", "type": "main", "index": 0 }]] },
            "4. Проверить Результаты": { "main": [[{ "node": "Форматировать Результаты", "type": "main", "index": 0 }]] }
        }
    })
}

#[allow(dead_code)]
pub fn migrations() -> Workflow {
    Workflow::from_value(migrations_value()).expect("migrations fixture is a valid workflow")
}

/// A single-step patch replacing one literal in `parameters.jsCode` of the node `node_name`.
#[allow(dead_code)]
pub fn js_patch(node_name: &str, find: &str, replace: &str) -> PatchDefinition {
    PatchDefinition::new("test-patch").with_step(Step::replace_text(
        NodeSelector::Name(node_name.to_string()),
        FieldPath::parse("parameters.jsCode").expect("valid field path"),
        find,
        replace,
    ))
}

/// Reads the `parameters.jsCode` string of the node named `node_name`.
#[allow(dead_code)]
pub fn js_code(workflow: &Workflow, node_name: &str) -> String {
    workflow
        .find_node(&NodeSelector::Name(node_name.to_string()))
        .and_then(|node| node["parameters"]["jsCode"].as_str())
        .map(str::to_string)
        .expect("node with jsCode present")
}

/// Path to a patch file shipped in the repository's `patches/` directory.
#[allow(dead_code)]
pub fn shipped_patch(file_name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("patches")
        .join(file_name)
}

/// Path to a workflow document under `tests/fixtures/`.
#[allow(dead_code)]
pub fn fixture(file_name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(file_name)
}

/// Copies a fixture document to `relative` under `root` and returns the copy's path.
#[allow(dead_code)]
pub fn install_fixture(root: &std::path::Path, file_name: &str, relative: &str) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().expect("relative path has a parent"))
        .expect("create fixture directory");
    std::fs::copy(fixture(file_name), &path).expect("copy fixture");
    path
}

/// Every shipped patch file, in numeric order.
#[allow(dead_code)]
pub fn shipped_patches() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(shipped_patch(""))
        .expect("patches directory")
        .map(|entry| entry.expect("directory entry").path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();
    paths
}
