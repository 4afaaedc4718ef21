use serde::{Deserialize, Serialize};

/// Guión archivado de un episodio anterior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PastTranscript {
    /// Nombre del archivo (`2025-03-10_EP004_script.txt`).
    pub name: String,
    pub text: String,
}

/// Lo que ya se cubrió en episodios confirmados: titulares registrados y
/// los guiones más recientes, del más viejo al más nuevo. La síntesis lo usa
/// para no repetir temas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeHistory {
    pub past_topics: Vec<String>,
    pub recent_transcripts: Vec<PastTranscript>,
}

impl EpisodeHistory {
    pub fn is_empty(&self) -> bool {
        self.past_topics.is_empty() && self.recent_transcripts.is_empty()
    }

    /// Si `topic` ya fue titular de algún episodio (sin distinguir
    /// mayúsculas ni espacios alrededor).
    pub fn covers(&self, topic: &str) -> bool {
        let topic = topic.trim();
        self.past_topics.iter().any(|t| t.trim().eq_ignore_ascii_case(topic))
    }
}
