use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::CoreError;
use crate::model::{EpisodeHistory, EpisodeState, FeedItem, PublicationLogEntry, ScriptArtifact};

/// Registro persistente de fingerprints de contenido ya vistos.
pub trait FingerprintStore: Send {
    /// Devuelve los items cuyo `content_hash` no estaba registrado (orden
    /// estable, duplicados del lote colapsados) y los registra como vistos en
    /// una sola unidad atómica. Si la persistencia falla, el conjunto
    /// registrado queda como estaba y se devuelve el error.
    fn filter_new(&mut self, items: Vec<FeedItem>) -> Result<Vec<FeedItem>, CoreError>;

    fn contains(&self, content_hash: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Registro único de episodios con semántica reserva/commit.
pub trait RunStateRepository: Send {
    fn snapshot(&self) -> EpisodeState;

    /// Reserva el próximo id sin confirmarlo. Falla con `StateConflict` si
    /// hay una reserva pendiente.
    fn begin_run(&mut self) -> Result<u64, CoreError>;

    /// Confirma la reserva y fija `last_run_at = at`. Repetir con el mismo id
    /// ya confirmado no hace nada.
    fn commit_run_at(&mut self, episode_id: u64, at: DateTime<Utc>) -> Result<(), CoreError>;

    fn commit_run(&mut self, episode_id: u64) -> Result<(), CoreError> {
        self.commit_run_at(episode_id, Utc::now())
    }

    /// Libera la reserva sin confirmarla; el id no vuelve a entregarse.
    fn release_run(&mut self, episode_id: u64) -> Result<(), CoreError>;
}

/// Log append-only de publicaciones.
pub trait PublicationLog: Send {
    fn append(&mut self, entry: &PublicationLogEntry) -> Result<(), CoreError>;
    fn entries(&self) -> Result<Vec<PublicationLogEntry>, CoreError>;
}

/// Salidas secundarias de un run (cache de noticias, guiones archivados,
/// titulares cubiertos y log del run) y su relectura como historial.
pub trait RunArchive: Send {
    fn cache_news(&mut self, items: &[FeedItem]) -> Result<(), CoreError>;
    fn archive_transcript(&mut self, episode_id: u64, date: NaiveDate, script: &ScriptArtifact) -> Result<PathBuf, CoreError>;
    fn write_run_log(&mut self, episode_id: u64, log: &serde_json::Value) -> Result<(), CoreError>;

    /// Agrega el titular de un episodio confirmado al registro de temas.
    fn record_topic(&mut self, episode_id: u64, topic: &str) -> Result<(), CoreError>;

    /// Todos los titulares registrados, en orden, más los últimos
    /// `transcripts` guiones archivados.
    fn history(&self, transcripts: usize) -> Result<EpisodeHistory, CoreError>;
}

/// Una línea por titular: sin saltos de línea ni espacios sobrantes.
pub fn topic_line(topic: &str) -> String {
    topic.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Núcleo de `filter_new`: items ausentes de `seen` (y de sí mismos), en
/// orden. No modifica `seen`.
pub fn select_new(seen: &HashSet<String>, items: Vec<FeedItem>) -> Vec<FeedItem> {
    let mut batch: HashSet<String> = HashSet::new();
    items.into_iter()
         .filter(|item| !seen.contains(&item.content_hash) && batch.insert(item.content_hash.clone()))
         .collect()
}
