use crate::scheduler::Plan;
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait Storage {
    /// Charge un plan calculé ; un fichier incohérent est refusé.
    fn load(&self) -> anyhow::Result<Plan>;
    /// Sauvegarde de manière atomique.
    fn save(&self, plan: &Plan) -> anyhow::Result<()>;
}

/// Plan sérialisé en JSON dans un seul fichier.
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Le fichier temporaire doit vivre dans le même dossier pour que le
    /// renommage reste atomique.
    fn staging_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Plan> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let plan: Plan = serde_json::from_slice(&data)
            .with_context(|| format!("parsing plan {}", self.path.display()))?;
        plan.validate()
            .with_context(|| format!("checking plan {}", self.path.display()))?;
        Ok(plan)
    }

    fn save(&self, plan: &Plan) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(plan)?;
        let mut tmp = NamedTempFile::new_in(self.staging_dir())
            .with_context(|| format!("creating temp file next to {}", self.path.display()))?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .with_context(|| format!("atomic rename to {}", self.path.display()))?;
        Ok(())
    }
}
