//! File-backed template repository.
//!
//! Each template is stored as `{dir}/{id}.json`. Writes go through a temp
//! file and a rename, and are serialized by an async lock.

use std::path::{Path, PathBuf};

use dft_media::fs_utils::write_atomic;
use dft_models::{Template, TemplateTracks, TemplateUpdate};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};

/// CRUD access to overlay templates on disk.
#[derive(Debug)]
pub struct TemplateRepository {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl TemplateRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve the file path for an id, rejecting ids that are not plain
    /// file names.
    fn path_for(&self, id: &str) -> Option<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| self.dir.join(format!("{id}.json")))
    }

    /// All templates, most recently updated first.
    ///
    /// Unreadable files are logged and skipped.
    pub async fn list(&self) -> EngineResult<Vec<Template>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut templates = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_template(&path).await {
                Ok(template) => templates.push(template),
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to load template"),
            }
        }

        templates.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(templates)
    }

    pub async fn get(&self, id: &str) -> EngineResult<Option<Template>> {
        let Some(path) = self.path_for(id) else {
            return Ok(None);
        };
        match read_template(&path).await {
            Ok(template) => Ok(Some(template)),
            Err(EngineError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create a template with a fresh id.
    pub async fn create(&self, name: &str, tracks: TemplateTracks) -> EngineResult<Template> {
        let template = Template::new(name, tracks);
        template.validate()?;

        let _guard = self.write_lock.lock().await;
        self.save(&template).await?;
        info!(template_id = %template.id, name = %template.name, "Created template");
        Ok(template)
    }

    /// Apply a partial update. Returns `None` for unknown ids.
    pub async fn update(&self, id: &str, update: TemplateUpdate) -> EngineResult<Option<Template>> {
        let _guard = self.write_lock.lock().await;
        let Some(mut template) = self.get(id).await? else {
            return Ok(None);
        };
        template.apply_update(update);
        template.validate()?;
        self.save(&template).await?;
        info!(template_id = %template.id, "Updated template");
        Ok(Some(template))
    }

    /// Delete a template. Returns whether it existed.
    pub async fn delete(&self, id: &str) -> EngineResult<bool> {
        let Some(path) = self.path_for(id) else {
            return Ok(false);
        };
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!(template_id = %id, "Deleted template");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, template: &Template) -> EngineResult<()> {
        let path = self
            .path_for(&template.id)
            .ok_or_else(|| EngineError::invalid_request(format!("Invalid template id: {}", template.id)))?;
        let json = serde_json::to_vec_pretty(template)?;
        write_atomic(&path, json).await?;
        Ok(())
    }
}

async fn read_template(path: &Path) -> EngineResult<Template> {
    let bytes = fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
