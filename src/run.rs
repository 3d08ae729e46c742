// Sequential driver: enumerate candidates, resolve each file's MIME type
// and key, publish one file at a time and print the content-address keys
// the service hands back. The first error aborts the remaining batch.

use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::api::{extract_keys, UploadClient};
use crate::config::Config;
use crate::enumerate::Files;
use crate::error::Result;
use crate::mime;

pub fn run(config: &Config, paths: Vec<PathBuf>) -> Result<()> {
    let files = if paths.is_empty() {
        Files::from_stdin(config.dedup)
    } else {
        Files::from_args(paths, config.dedup)
    };

    if config.dry_run {
        return dry_run(config, files);
    }

    let client = UploadClient::new(config)?;
    let mut session = KeySession::new(config);

    for entry in files {
        let path = entry?;
        let target = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        upload_one(config, &client, &mut session, &path, &target)?;
    }

    // The index document lives at the key's root: empty target path.
    if let Some(index) = &config.index {
        upload_one(config, &client, &mut session, index, "")?;
    }

    Ok(())
}

/// Resolve and print MIME types only; no client, no network.
fn dry_run(config: &Config, files: Files) -> Result<()> {
    for entry in files {
        let path = entry?;
        let mime = mime::detect(&path, config.sniff_mime)?;
        println!("{}: {}", path.display(), mime);
    }
    if let Some(index) = &config.index {
        let mime = mime::detect(index, config.sniff_mime)?;
        println!("{}: {}", index.display(), mime);
    }
    Ok(())
}

fn upload_one(
    config: &Config,
    client: &UploadClient,
    session: &mut KeySession,
    path: &Path,
    target: &str,
) -> Result<()> {
    let mime = mime::detect(path, config.sniff_mime)?;
    let key = session.key_for_next_file(client)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.set_message(format!("Uploading {}", path.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let outcome = client.publish(target, path, &mime, &key);
    spinner.finish_and_clear();

    let body = outcome?;
    let keys = extract_keys(&body);
    if keys.is_empty() {
        tracing::warn!(path = %path.display(), "response contained no content-address keys");
    }
    for (kind, link) in keys {
        println!("{kind}: {link}");
    }
    Ok(())
}

/// Key policy for one run: a configured key is reused for every file, an
/// absent key is generated remotely once, and unique mode generates a fresh
/// key per file (discarding any configured key with a warning).
struct KeySession {
    unique: bool,
    key: Option<String>,
}

impl KeySession {
    fn new(config: &Config) -> Self {
        if config.unique_key && config.key.is_some() {
            tracing::warn!("ignoring the configured key: --unique generates a fresh key per file");
        }
        KeySession {
            unique: config.unique_key,
            key: if config.unique_key {
                None
            } else {
                config.key.clone()
            },
        }
    }

    fn key_for_next_file(&mut self, client: &UploadClient) -> Result<String> {
        if self.unique {
            return client.generate_key();
        }
        if let Some(key) = &self.key {
            return Ok(key.clone());
        }
        let key = client.generate_key()?;
        tracing::info!(%key, "generated publishing key for this run");
        self.key = Some(key.clone());
        Ok(key)
    }
}
