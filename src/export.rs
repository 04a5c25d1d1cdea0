use crate::error::Result;
use crate::melody::{Melody, MelodyNote};
use crate::music::{Clef, Difficulty};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// What a document writer needs to lay out a practice sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRequest {
    pub key_signature: String,
    pub time_signature: String,
    pub clef: Clef,
    pub difficulty: Difficulty,
    pub melody: Vec<MelodyNote>,
}

impl From<&Melody> for LayoutRequest {
    fn from(melody: &Melody) -> Self {
        Self {
            key_signature: melody.key_signature.clone(),
            time_signature: melody.time_signature.clone(),
            clef: melody.clef,
            difficulty: melody.difficulty,
            melody: melody.melody.clone(),
        }
    }
}

impl LayoutRequest {
    /// Notes bucketed by measure number, in measure order
    pub fn measures(&self) -> BTreeMap<usize, Vec<&MelodyNote>> {
        let mut measures: BTreeMap<usize, Vec<&MelodyNote>> = BTreeMap::new();
        for note in &self.melody {
            measures.entry(note.measure).or_default().push(note);
        }
        measures
    }
}

/// Renders a layout request to some document on disk
pub trait DocumentWriter {
    /// Write the document and return the file name it was saved under
    fn write(&self, layout: &LayoutRequest) -> Result<String>;
}

/// Saves the layout request itself as pretty JSON, for an external renderer
#[derive(Debug, Clone)]
pub struct JsonLayoutWriter {
    dir: PathBuf,
}

impl JsonLayoutWriter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DocumentWriter for JsonLayoutWriter {
    fn write(&self, layout: &LayoutRequest) -> Result<String> {
        fs::create_dir_all(&self.dir)?;
        let filename = format!(
            "practice_sheet_{}.json",
            Local::now().format("%Y%m%d_%H%M%S")
        );
        let data = serde_json::to_vec_pretty(layout)?;
        fs::write(self.dir.join(&filename), data)?;
        tracing::info!(file = %filename, "practice sheet exported");
        Ok(filename)
    }
}
