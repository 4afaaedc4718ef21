//! Colaboradores offline: locales, deterministas y sin red.
//!
//! Leen snapshots de feeds desde disco y escriben sus salidas (narración,
//! cabeceras SVG, registros de publicación) bajo un directorio de salida:
//!
//! ```text
//! {output}/feeds/<host-y-ruta>.json   snapshots de entrada
//! {output}/audio/EP007_narration.txt
//! {output}/images/header-<slug>.svg
//! {output}/outbox/<plataforma>/...json
//! ```

mod media;
mod notify;
mod outbox;
mod review;
mod scraper;
mod writers;

pub use media::{NarrationRenderer, SvgHeaderRenderer};
pub use notify::TracingNotifier;
pub use outbox::Outbox;
pub use review::HeuristicReviewer;
pub use scraper::{snapshot_file_name, FeedSnapshotEntry, SnapshotScraper};
pub use writers::{TemplateNewsletterWriter, TemplateScriptWriter, TemplateSynthesizer};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use vibe_core::{CollaboratorError, Collaborators};

/// Conjunto completo de colaboradores offline sobre `output_dir`.
pub fn offline_collaborators(output_dir: impl Into<PathBuf>) -> Collaborators {
    let output_dir = output_dir.into();
    let outbox = Arc::new(Outbox::new(output_dir.join("outbox")));
    Collaborators { scraper: Arc::new(SnapshotScraper::new(output_dir.join("feeds"))),
                    synthesizer: Arc::new(TemplateSynthesizer),
                    script_writer: Arc::new(TemplateScriptWriter),
                    audio: Arc::new(NarrationRenderer::new(output_dir.join("audio"))),
                    newsletter_writer: Arc::new(TemplateNewsletterWriter),
                    image: Arc::new(SvgHeaderRenderer::new(output_dir.join("images"))),
                    reviewer: Arc::new(HeuristicReviewer),
                    podcast: outbox.clone(),
                    newsletter_publisher: outbox.clone(),
                    social: outbox.clone(),
                    community: outbox.clone(),
                    analytics: outbox,
                    notifier: Arc::new(TracingNotifier) }
}

pub(crate) async fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), CollaboratorError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}

/// Escapa texto para insertarlo en contenido o en atributos entre comillas
/// de las plantillas HTML/SVG offline. No sanea markup de terceros: los
/// generadores sólo interpolan titulares, links y resúmenes.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
