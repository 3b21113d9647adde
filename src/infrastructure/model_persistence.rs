use crate::application::ml::predictor::ModelArtifact;
use crate::domain::errors::ArtifactError;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// File-backed store for the single fitted model artifact (JSON)
pub struct ModelArtifactStore {
    file_path: PathBuf,
}

impl ModelArtifactStore {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn exists(&self) -> bool {
        self.file_path.exists()
    }

    /// `Ok(None)` when no artifact has been written yet
    pub fn load(&self) -> Result<Option<ModelArtifact>, ArtifactError> {
        if !self.file_path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.file_path).map_err(|source| self.io_err(source))?;
        let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| ArtifactError::Format {
                path: self.file_path.display().to_string(),
                source,
            })?;

        info!(
            model = artifact.model_name(),
            scaled = artifact.scaler.is_some(),
            "Loaded model artifact from {:?}",
            self.file_path
        );
        Ok(Some(artifact))
    }

    pub fn save(&self, artifact: &ModelArtifact) -> Result<(), ArtifactError> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| self.io_err(source))?;
            }
        }

        // Atomic write: write to temp file then rename
        let temp_path = self.file_path.with_extension("tmp");
        {
            let file = File::create(&temp_path).map_err(|source| self.io_err(source))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, artifact).map_err(|source| {
                ArtifactError::Format {
                    path: temp_path.display().to_string(),
                    source,
                }
            })?;
            writer.flush().map_err(|source| self.io_err(source))?;
        }
        fs::rename(&temp_path, &self.file_path).map_err(|source| self.io_err(source))?;

        info!("Saved model artifact to {:?}", self.file_path);
        Ok(())
    }

    fn io_err(&self, source: std::io::Error) -> ArtifactError {
        ArtifactError::Io {
            path: self.file_path.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::fallback::fallback_dataset;
    use crate::application::ml::training::train_on_all;
    use crate::config::{ClassifierAlgorithm, ModelEnvConfig};

    fn temp_store() -> ModelArtifactStore {
        let dir = std::env::temp_dir().join(format!("cardiorisk-{}", uuid::Uuid::new_v4()));
        ModelArtifactStore::new(dir.join("model.json"))
    }

    #[test]
    fn test_missing_artifact_loads_none() {
        let store = temp_store();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_scores_identically() {
        let store = temp_store();
        let config = ModelEnvConfig::default();
        let (artifact, _) =
            train_on_all(&fallback_dataset(), ClassifierAlgorithm::Linear, &config).unwrap();

        store.save(&artifact).unwrap();
        assert!(store.exists());
        let reloaded = store.load().unwrap().unwrap();

        for row in fallback_dataset().features {
            assert_eq!(artifact.score(&row).unwrap(), reloaded.score(&row).unwrap());
        }
    }

    #[test]
    fn test_corrupt_artifact_is_format_error() {
        let store = temp_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.load(), Err(ArtifactError::Format { .. })));
    }
}
