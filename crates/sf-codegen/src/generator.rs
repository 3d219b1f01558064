//! Describe objects and write generated modules to disk.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use cloudy_sf_client::RequestGateway;
use cloudy_sf_rest::describe;

use crate::error::{Error, ErrorKind, Result};
use crate::render;
use crate::model::ObjectSpec;

/// Default directory generated modules are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "sobjects";

/// SObject model generator.
///
/// # Example
///
/// ```rust,ignore
/// use cloudy_sf_codegen::Generator;
///
/// let generator = Generator::new(client, "src/sobjects");
/// let written = generator.generate_all(&["Account", "Contact"]).await?;
/// ```
#[derive(Debug)]
pub struct Generator<G> {
    gateway: G,
    output_dir: PathBuf,
}

impl<G: RequestGateway> Generator<G> {
    pub fn new(gateway: G, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            gateway,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Describe each object once, in the order given.
    pub async fn object_specs<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<ObjectSpec>> {
        let mut seen = HashSet::new();
        let mut specs = Vec::with_capacity(names.len());

        for name in names.iter().map(AsRef::as_ref) {
            if !seen.insert(name) {
                continue;
            }
            let describe = describe::describe_sobject(&self.gateway, name).await?;
            specs.push(ObjectSpec::from_describe(&describe));
        }

        Ok(specs)
    }

    /// Describe every object and write one module per object plus `mod.rs`.
    ///
    /// Nothing is written unless every describe succeeds. Returns the written
    /// paths, `mod.rs` last.
    #[instrument(skip(self, names), fields(output_dir = %self.output_dir.display()))]
    pub async fn generate_all<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<PathBuf>> {
        if names.is_empty() {
            return Err(Error::new(ErrorKind::Config(
                "no sobject names to generate".to_string(),
            )));
        }

        let specs = self.object_specs(names).await?;
        self.write_specs(&specs)
    }

    /// Write already-built specs to the output directory.
    pub fn write_specs(&self, specs: &[ObjectSpec]) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir)?;

        let mut written = Vec::with_capacity(specs.len() + 1);
        for spec in specs {
            let path = self
                .output_dir
                .join(format!("{}.rs", render::module_name(&spec.class_name)));
            fs::write(&path, render::render_object(spec))?;
            info!(path = %path.display(), "generated");
            written.push(path);
        }

        let mod_path = self.output_dir.join("mod.rs");
        fs::write(&mod_path, render::render_mod(specs))?;
        info!(path = %mod_path.display(), "generated");
        written.push(mod_path);

        Ok(written)
    }
}
