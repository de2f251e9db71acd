//! Embedding provider implementations.
//!
//! `build(config, api_key)` is the factory, called once at startup.
//! `Ok(None)` means embeddings are switched off (`default = "none"`);
//! an `Err` means the configured provider could not be constructed, which
//! callers treat as "run keyword-only".

pub mod hashing;
#[cfg(feature = "embeddings-openai")]
pub mod openai_compatible;

use crate::config::EmbeddingsConfig;
use crate::embeddings::{EmbeddingProvider, ProviderError};

/// Construct an `EmbeddingProvider` from config and an optional API key.
///
/// `api_key` is sourced from `EMBEDDINGS_API_KEY` env (never TOML).
pub fn build(
    config: &EmbeddingsConfig,
    api_key: Option<String>,
) -> Result<Option<EmbeddingProvider>, ProviderError> {
    match config.provider.as_str() {
        "none" | "" => Ok(None),
        "hashing" => {
            if config.hashing.dimensions == 0 {
                return Err(ProviderError::Unavailable(
                    "hashing embedder needs dimensions > 0".into(),
                ));
            }
            Ok(Some(EmbeddingProvider::Hashing(hashing::HashingEmbedder::new(
                config.hashing.dimensions,
            ))))
        }
        #[cfg(feature = "embeddings-openai")]
        "openai" | "openai-compatible" => {
            let oai = &config.openai;
            let p = openai_compatible::OpenAiCompatibleEmbedder::new(
                oai.api_base_url.clone(),
                oai.model.clone(),
                oai.timeout_seconds,
                api_key,
            )?;
            Ok(Some(EmbeddingProvider::OpenAiCompatible(p)))
        }
        #[cfg(not(feature = "embeddings-openai"))]
        "openai" | "openai-compatible" => {
            let _ = api_key;
            Err(ProviderError::Unavailable(
                "openai embeddings require the `embeddings-openai` feature".into(),
            ))
        }
        _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn none_disables_embeddings() {
        let mut cfg = Config::test_default(std::path::Path::new("/tmp")).embeddings;
        cfg.provider = "none".into();
        assert!(build(&cfg, None).unwrap().is_none());
    }

    #[test]
    fn hashing_is_built() {
        let cfg = Config::test_default(std::path::Path::new("/tmp")).embeddings;
        let p = build(&cfg, None).unwrap().expect("provider");
        assert_eq!(p.name(), "hashing");
    }

    #[test]
    fn zero_dimensions_is_unavailable() {
        let mut cfg = Config::test_default(std::path::Path::new("/tmp")).embeddings;
        cfg.hashing.dimensions = 0;
        assert!(matches!(build(&cfg, None), Err(ProviderError::Unavailable(_))));
    }

    #[test]
    fn unknown_provider_errors() {
        let mut cfg = Config::test_default(std::path::Path::new("/tmp")).embeddings;
        cfg.provider = "word2vec".into();
        assert!(matches!(build(&cfg, None), Err(ProviderError::UnknownProvider(_))));
    }
}
