//! # Loader - BAST files from disk or the network
//!
//! Thin orchestration over the `bast` codec: fetch bytes, enforce the
//! configured size limit, decode, and splice the result into a larger model.
//! Saving goes through a temp file and a rename so readers never observe a
//! half-written file.
//!
//! ```no_run
//! use loader::Loader;
//! use config::{CodecConfig, LoaderConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let loader = Loader::new(LoaderConfig::default());
//! let model = loader.load("models/shop.bast")?;
//! Loader::save("models/shop.compact.bast", &model, &CodecConfig::COMPACT)?;
//! # Ok(())
//! # }
//! ```

mod fetch;
mod save;
mod source;

use std::path::Path;

use anyhow::{bail, Context, Result};
use ast::{Definition, Nebula};
use config::{CodecConfig, LoaderConfig};
use log::info;

pub use source::Source;

pub struct Loader {
    cfg: LoaderConfig,
}

impl Loader {
    pub fn new(cfg: LoaderConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.cfg
    }

    /// Reads raw bytes from a URL, `file://` URL or plain path.
    pub fn fetch(&self, source: &str) -> Result<Vec<u8>> {
        let source = Source::parse(source);
        self.fetch_source(&source)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn fetch_source(&self, source: &Source) -> Result<Vec<u8>> {
        match source {
            Source::Url(url) => {
                if !self.cfg.allow_network {
                    bail!("cannot load {url}: network access is disabled");
                }
                fetch::fetch_url(url, &self.cfg)
            }
            Source::File(path) => fetch::read_file(path, &self.cfg),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn fetch_source(&self, source: &Source) -> Result<Vec<u8>> {
        bail!("cannot load {source}: blocking I/O is unavailable on this target")
    }

    /// Fetches and decodes one model.
    pub fn load(&self, source: &str) -> Result<Nebula> {
        let parsed = Source::parse(source);
        let bytes = self.fetch_source(&parsed)?;
        let nebula =
            bast::decode(&bytes).with_context(|| format!("failed to decode {parsed}"))?;
        info!(
            "loaded {parsed}: {} bytes, {} definitions",
            bytes.len(),
            nebula.definition_count()
        );
        Ok(nebula)
    }

    /// Loads `source` and appends its top-level definitions to `into`.
    /// Returns how many were appended.
    pub fn import_into(&self, source: &str, into: &mut Vec<Definition>) -> Result<usize> {
        let nebula = self.load(source)?;
        let added = nebula.contents.len();
        into.extend(nebula.contents);
        Ok(added)
    }

    /// Encodes `nebula` and writes it atomically to `path`. Returns the
    /// number of bytes written.
    pub fn save(path: impl AsRef<Path>, nebula: &Nebula, cfg: &CodecConfig) -> Result<u64> {
        let path = path.as_ref();
        let bytes = bast::encode(nebula, cfg)
            .with_context(|| format!("failed to encode model for {}", path.display()))?;
        save::write_atomic(path, &bytes)?;
        info!("saved {}: {} bytes", path.display(), bytes.len());
        Ok(bytes.len() as u64)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(LoaderConfig::from_env())
    }
}
