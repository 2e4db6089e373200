use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::json;
use tracing::info;

use super::HubError;

const HUB_BASE_URL: &str = "https://huggingface.co";

/// Uploads every file under `directory` to the registry entry
/// `registry_id`, recording `commit_message`. Single attempt, no retry;
/// the outcome is reported to the invoking operator via the result.
///
/// # Errors
///
/// - `HubError::InvalidInput` if the directory does not exist or holds
///   no uploadable files
/// - `HubError::ResourceUnavailable` on network or auth failure
pub async fn publish(
    directory: &Path,
    registry_id: &str,
    commit_message: &str,
    token: Option<&str>,
) -> Result<(), HubError> {
    if !directory.is_dir() {
        return Err(HubError::InvalidInput(format!(
            "Model directory not found at: {}",
            directory.display()
        )));
    }

    let files = collect_files(directory)?;
    if files.is_empty() {
        return Err(HubError::InvalidInput(format!(
            "No files to upload under: {}",
            directory.display()
        )));
    }

    info!(
        "Publishing {} file(s) from {} to {}",
        files.len(),
        directory.display(),
        registry_id
    );

    let payload = commit_payload(&files, commit_message)?;
    let url = format!("{}/api/models/{}/commit/main", HUB_BASE_URL, registry_id);

    let client = reqwest::Client::new();
    let mut request = client
        .post(&url)
        .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
        .body(payload);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    let response = request.send().await.map_err(|e| {
        HubError::ResourceUnavailable(format!("Commit request to {} failed: {}", registry_id, e))
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(HubError::ResourceUnavailable(format!(
            "Registry rejected commit to {}: HTTP {} {}",
            registry_id, status, body
        )));
    }

    info!("Published {} to {}", directory.display(), registry_id);
    Ok(())
}

/// Walks the directory and returns (absolute path, registry-relative
/// path) pairs, sorted for a deterministic commit. Hidden files are
/// skipped.
fn collect_files(directory: &Path) -> Result<Vec<(PathBuf, String)>, HubError> {
    let mut files = Vec::new();
    walk(directory, directory, &mut files)?;
    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}

fn walk(
    root: &Path,
    current: &Path,
    files: &mut Vec<(PathBuf, String)>,
) -> Result<(), HubError> {
    let entries = fs::read_dir(current).map_err(|e| {
        HubError::InvalidInput(format!("Failed to read {}: {}", current.display(), e))
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| {
            HubError::InvalidInput(format!("Failed to read {}: {}", current.display(), e))
        })?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        if path.is_dir() {
            walk(root, &path, files)?;
        } else {
            let relative = path
                .strip_prefix(root)
                .map_err(|e| HubError::InvalidInput(e.to_string()))?
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join("/");
            files.push((path, relative));
        }
    }
    Ok(())
}

/// Builds the NDJSON commit body: one header line carrying the commit
/// message, then one base64-encoded line per file.
// TODO: route files larger than 10 MB through the LFS preupload flow
// instead of inlining them into the commit body.
fn commit_payload(files: &[(PathBuf, String)], commit_message: &str) -> Result<String, HubError> {
    let mut lines = Vec::with_capacity(files.len() + 1);
    lines.push(
        json!({
            "key": "header",
            "value": { "summary": commit_message }
        })
        .to_string(),
    );

    for (path, relative) in files {
        let bytes = fs::read(path).map_err(|e| {
            HubError::InvalidInput(format!("Failed to read {}: {}", path.display(), e))
        })?;
        lines.push(
            json!({
                "key": "file",
                "value": {
                    "path": relative,
                    "content": STANDARD.encode(&bytes),
                    "encoding": "base64"
                }
            })
            .to_string(),
        );
    }

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.json"), b"{\"model\":\"t5\"}").unwrap();
        fs::write(dir.path().join(".gitattributes"), b"ignored").unwrap();
        fs::create_dir(dir.path().join("spiece")).unwrap();
        fs::write(dir.path().join("spiece").join("vocab.txt"), b"a b c").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_publish_rejects_missing_directory() {
        let err = publish(
            Path::new("/definitely/not/a/model_directory"),
            "dps13/text-summarizer-model",
            "Upload fine-tuned model",
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, HubError::InvalidInput(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_collect_files_skips_hidden_and_recurses() {
        let dir = fixture_dir();
        let files = collect_files(dir.path()).unwrap();
        let relative: Vec<&str> = files.iter().map(|(_, r)| r.as_str()).collect();
        assert_eq!(relative, vec!["config.json", "spiece/vocab.txt"]);
    }

    #[test]
    fn test_commit_payload_header_then_encoded_files() {
        let dir = fixture_dir();
        let files = collect_files(dir.path()).unwrap();
        let payload = commit_payload(&files, "Upload fine-tuned model").unwrap();
        let lines: Vec<&str> = payload.lines().collect();
        assert_eq!(lines.len(), 3);

        let header: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(header["key"], "header");
        assert_eq!(header["value"]["summary"], "Upload fine-tuned model");

        let file: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(file["key"], "file");
        assert_eq!(file["value"]["path"], "config.json");
        let decoded = STANDARD
            .decode(file["value"]["content"].as_str().unwrap())
            .unwrap();
        assert_eq!(decoded, b"{\"model\":\"t5\"}");
    }
}
