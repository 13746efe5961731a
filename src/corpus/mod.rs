use std::collections::BTreeMap;

use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CorpusError;

static CORPUS_DIR: Dir = include_dir!("src/corpus");

const EMBEDDED_CORPUS: &str = "sindhi.json";

/// Difficulty tier of target sentences
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tier {
    Simple,
    Medium,
    Hard,
}

/// Read-only sentence lists keyed by tier
#[derive(Deserialize, Clone, Debug)]
pub struct SentenceCorpus {
    pub name: String,
    pub sentences: BTreeMap<Tier, Vec<String>>,
}

impl SentenceCorpus {
    /// The corpus bundled into the binary.
    pub fn embedded() -> Result<Self, CorpusError> {
        read_corpus_from_file(EMBEDDED_CORPUS)
    }

    pub fn from_json(json: &str) -> Result<Self, CorpusError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn sentences(&self, tier: Tier) -> &[String] {
        self.sentences.get(&tier).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn tiers(&self) -> impl Iterator<Item = Tier> + '_ {
        self.sentences
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(tier, _)| *tier)
    }

    /// Uniformly random sentence of `tier`. An empty tier is a configuration
    /// error; no other tier is substituted.
    pub fn pick_sentence(&self, tier: Tier) -> Result<String, CorpusError> {
        self.pick_sentence_with(tier, &mut rand::thread_rng())
    }

    pub fn pick_sentence_with<R: Rng + ?Sized>(
        &self,
        tier: Tier,
        rng: &mut R,
    ) -> Result<String, CorpusError> {
        self.sentences(tier)
            .choose(rng)
            .cloned()
            .ok_or(CorpusError::EmptyTier(tier))
    }
}

fn read_corpus_from_file(file_name: &str) -> Result<SentenceCorpus, CorpusError> {
    let file = CORPUS_DIR
        .get_file(file_name)
        .ok_or_else(|| CorpusError::Missing(file_name.to_string()))?;

    let contents = file.contents_utf8().ok_or(CorpusError::Encoding)?;

    SentenceCorpus::from_json(contents)
}
