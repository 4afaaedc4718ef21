use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialPlatform {
    Twitter,
    #[serde(rename = "linkedin")]
    LinkedIn,
}

impl SocialPlatform {
    /// Límite de caracteres por mensaje, si la plataforma lo impone.
    pub fn char_limit(self) -> Option<usize> {
        match self {
            SocialPlatform::Twitter => Some(280),
            SocialPlatform::LinkedIn => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SocialPlatform::Twitter => "twitter",
            SocialPlatform::LinkedIn => "linkedin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialPost {
    pub platform: SocialPlatform,
    pub text: String,
}

impl SocialPost {
    /// Mensajes a publicar en orden; más de uno forma un hilo de respuestas.
    pub fn thread(&self) -> Vec<String> {
        match self.platform.char_limit() {
            Some(limit) => split_thread(&self.text, limit),
            None => vec![self.text.clone()],
        }
    }
}

/// Parte `text` en segmentos de a lo sumo `limit` caracteres. Corta en el
/// último salto de línea antes del límite; si no hay, en el último espacio;
/// si tampoco, en seco.
pub fn split_thread(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut out = Vec::new();
    let mut rest = text.trim();
    while rest.chars().count() > limit {
        // índice en bytes del carácter `limit`
        let hard = rest.char_indices().nth(limit).map(|(i, _)| i).unwrap_or(rest.len());
        let window = &rest[..hard];
        let cut = window.rfind('\n')
                        .or_else(|| window.rfind(' '))
                        .filter(|&i| i > 0)
                        .unwrap_or(hard);
        out.push(rest[..cut].trim_end().to_string());
        rest = rest[cut..].trim_start();
    }
    if !rest.is_empty() {
        out.push(rest.to_string());
    }
    out
}
