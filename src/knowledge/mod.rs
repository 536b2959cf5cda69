//! Domain knowledge retrieval.
//!
//! A static, versioned corpus of tagged text chunks with a deliberately
//! simple retrieval contract: a chunk matches when any of its tags is a
//! substring of the lowercased query. Matches are quoted with source
//! attribution; zero matches fall back to a fixed first principle. No
//! ranking, no vector search - the output must be deterministic and
//! explainable.

use serde::{Deserialize, Serialize};

/// Returned when no chunk matches the query.
pub const FALLBACK_PRINCIPLE: &str = "[SOURCE: first principles]\n\"When in doubt, do no harm: reduce training load and protect the athlete's long-term health.\"";

/// Keyword that confirms load-management knowledge was retrieved.
pub const LOAD_RATIO_KEYWORD: &str = "load ratio";

/// Category of a knowledge chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeCategory {
    LoadManagement,
    InjuryPrevention,
    Recovery,
    Periodization,
    Technique,
}

impl KnowledgeCategory {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            KnowledgeCategory::LoadManagement => "Load Management",
            KnowledgeCategory::InjuryPrevention => "Injury Prevention",
            KnowledgeCategory::Recovery => "Recovery",
            KnowledgeCategory::Periodization => "Periodization",
            KnowledgeCategory::Technique => "Technique",
        }
    }
}

/// One tagged chunk of domain knowledge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    /// Attributed source
    pub source: String,
    /// Category
    pub category: KnowledgeCategory,
    /// Match tags; a chunk is retrieved when any tag is a substring of the query
    pub tags: Vec<String>,
    /// Quoted content
    pub content: String,
}

/// The static knowledge corpus.
pub struct KnowledgeBase {
    version: String,
    chunks: Vec<KnowledgeChunk>,
}

impl KnowledgeBase {
    /// Build a corpus from explicit chunks.
    pub fn new(version: impl Into<String>, chunks: Vec<KnowledgeChunk>) -> Self {
        Self {
            version: version.into(),
            chunks,
        }
    }

    /// Corpus version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Number of chunks in the corpus.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the corpus is empty.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Retrieve every chunk whose tags match the query.
    ///
    /// Matching chunks are rendered as `[SOURCE: x]` blocks separated by
    /// blank lines, in corpus order. No matches returns the fallback
    /// principle.
    pub fn retrieve(&self, query: &str) -> String {
        let query = query.to_lowercase();

        let blocks: Vec<String> = self
            .chunks
            .iter()
            .filter(|chunk| chunk.tags.iter().any(|tag| query.contains(tag.as_str())))
            .map(|chunk| format!("[SOURCE: {}]\n\"{}\"", chunk.source, chunk.content))
            .collect();

        if blocks.is_empty() {
            FALLBACK_PRINCIPLE.to_string()
        } else {
            blocks.join("\n\n")
        }
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new("2026.1", builtin_corpus())
    }
}

fn chunk(
    source: &str,
    category: KnowledgeCategory,
    tags: &[&str],
    content: &str,
) -> KnowledgeChunk {
    KnowledgeChunk {
        source: source.to_string(),
        category,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        content: content.to_string(),
    }
}

/// The built-in sports-science corpus.
fn builtin_corpus() -> Vec<KnowledgeChunk> {
    vec![
        chunk(
            "Gabbett 2016, training-injury prevention paradox",
            KnowledgeCategory::LoadManagement,
            &["load ratio", "acwr", "workload", "spike"],
            "Acute:chronic load ratio values above 1.5 are associated with a sharp rise in \
             injury risk; week-to-week load increases should stay under 10% and high-intensity \
             exposure should be withheld while the load ratio is elevated.",
        ),
        chunk(
            "IOC consensus on youth athletic development",
            KnowledgeCategory::InjuryPrevention,
            &["injury", "pain", "high risk"],
            "Training through pain above mild levels converts reversible overload into \
             structural injury; persistent pain reports require load reduction and review \
             before any high-intensity work resumes.",
        ),
        chunk(
            "Sleep and athletic recovery consensus statement",
            KnowledgeCategory::Recovery,
            &["sleep", "recovery", "readiness", "hrv"],
            "Sleep quality below seven hours or a falling heart-rate-variability trend \
             indicates incomplete recovery; schedule low-intensity sessions until markers \
             normalize.",
        ),
        chunk(
            "Foster session-RPE monitoring method",
            KnowledgeCategory::LoadManagement,
            &["rpe", "effort", "fatigue", "monotony"],
            "Session RPE above 8 on consecutive days signals accumulating fatigue; vary \
             session strain and insert recovery days to break training monotony.",
        ),
        chunk(
            "Bompa periodization handbook",
            KnowledgeCategory::Periodization,
            &["taper", "phase", "competition", "peak"],
            "Tapering reduces volume by 40-60% while preserving intensity; introducing new \
             high-intensity stimuli inside the taper window compromises the peak.",
        ),
        chunk(
            "Motor learning review, technique retention",
            KnowledgeCategory::Technique,
            &["technique", "video", "analysis", "trend"],
            "Declining technical scores under fatigue indicate that skill work should be \
             scheduled before conditioning work, never after it.",
        ),
    ]
}
