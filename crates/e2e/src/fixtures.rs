//! Candidate fixtures used to fill the add-candidate form

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{E2eError, E2eResult};

const BUILTIN_CANDIDATES: &str = include_str!("../fixtures/candidates.yaml");

/// One set of form values for a new candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl Candidate {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidatePool {
    pub candidates: Vec<Candidate>,
}

impl CandidatePool {
    /// The pool shipped in `fixtures/candidates.yaml`
    pub fn builtin() -> E2eResult<Self> {
        Self::from_yaml(BUILTIN_CANDIDATES)
    }

    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let pool: Self = serde_yaml::from_str(yaml)?;
        if pool.candidates.is_empty() {
            return Err(E2eError::Fixture("candidate pool is empty".to_string()));
        }
        Ok(pool)
    }

    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| match e {
            E2eError::Fixture(msg) => E2eError::Fixture(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Merge every YAML pool found under `dir`, in file name order
    pub fn load_dir(dir: &Path) -> E2eResult<Self> {
        let mut candidates = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            let pool = Self::from_file(entry.path())?;
            candidates.extend(pool.candidates);
        }

        if candidates.is_empty() {
            return Err(E2eError::Fixture(format!(
                "no candidates found under {}",
                dir.display()
            )));
        }
        Ok(Self { candidates })
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Uniformly random candidate
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> E2eResult<&Candidate> {
        self.candidates
            .choose(rng)
            .ok_or_else(|| E2eError::Fixture("candidate pool is empty".to_string()))
    }
}
