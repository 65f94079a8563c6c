//! Shader source management.
//!
//! Compute kernels are assembled from several WGSL fragments (for example a
//! shared ray/box intersection helper plus the kernel body). Fragments are
//! either embedded at compile time or read from disk, in which case
//! [`KernelSource::combined_source`] re-reads them on every call so a shader
//! reload picks up edits.

use std::path::{Path, PathBuf};

use crate::error::{RenderError, RenderResult};

/// One WGSL fragment of a kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderFragment {
    /// Source compiled into the binary.
    Embedded(&'static str),
    /// Source read from a file at build time of the kernel.
    File(PathBuf),
}

impl ShaderFragment {
    fn load(&self) -> RenderResult<String> {
        match self {
            ShaderFragment::Embedded(source) => Ok((*source).to_string()),
            ShaderFragment::File(path) => {
                std::fs::read_to_string(path).map_err(|source| {
                    RenderError::ShaderSourceUnreadable {
                        path: path.display().to_string(),
                        source,
                    }
                })
            }
        }
    }
}

/// Builder describing the source of a compute kernel.
#[derive(Debug, Clone)]
pub struct KernelSource {
    fragments: Vec<ShaderFragment>,
    entry_point: String,
    label: Option<String>,
}

impl KernelSource {
    /// Creates an empty kernel source with entry point `main`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fragments: Vec::new(),
            entry_point: "main".to_string(),
            label: None,
        }
    }

    /// Appends an embedded WGSL fragment.
    #[must_use]
    pub fn with_fragment(mut self, source: &'static str) -> Self {
        self.fragments.push(ShaderFragment::Embedded(source));
        self
    }

    /// Appends a WGSL fragment read from `path`.
    #[must_use]
    pub fn with_fragment_file(mut self, path: impl AsRef<Path>) -> Self {
        self.fragments
            .push(ShaderFragment::File(path.as_ref().to_path_buf()));
        self
    }

    /// Sets the compute entry point.
    #[must_use]
    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry_point = entry.into();
        self
    }

    /// Sets the shader label for debugging.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn fragments(&self) -> &[ShaderFragment] {
        &self.fragments
    }

    #[must_use]
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Concatenates all fragments in insertion order.
    pub fn combined_source(&self) -> RenderResult<String> {
        if self.fragments.is_empty() {
            return Err(RenderError::ShaderCompilationFailed(
                "kernel has no shader fragments".into(),
            ));
        }
        let parts = self
            .fragments
            .iter()
            .map(ShaderFragment::load)
            .collect::<RenderResult<Vec<_>>>()?;
        Ok(parts.join("\n\n"))
    }

    /// Builds the shader module (does not create a pipeline).
    pub fn build_module(&self, device: &wgpu::Device) -> RenderResult<wgpu::ShaderModule> {
        let source = self.combined_source()?;
        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: self.label.as_deref(),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        }))
    }
}

impl Default for KernelSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragments_are_joined_in_order() {
        let source = KernelSource::new()
            .with_fragment("fn helper() {}")
            .with_fragment("@compute @workgroup_size(1) fn main() { helper(); }");
        let combined = source.combined_source().unwrap();
        let helper = combined.find("fn helper").unwrap();
        let main = combined.find("fn main").unwrap();
        assert!(helper < main);
    }

    #[test]
    fn test_empty_source_is_rejected() {
        assert!(matches!(
            KernelSource::new().combined_source(),
            Err(RenderError::ShaderCompilationFailed(_))
        ));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let source = KernelSource::new().with_fragment_file("/nonexistent/kernel.wgsl");
        match source.combined_source() {
            Err(RenderError::ShaderSourceUnreadable { path, .. }) => {
                assert!(path.ends_with("kernel.wgsl"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_file_fragment_is_reread() {
        let path = std::env::temp_dir().join(format!("volrend_reload_{}.wgsl", std::process::id()));
        std::fs::write(&path, "// first").unwrap();
        let source = KernelSource::new().with_fragment_file(&path);
        assert_eq!(source.combined_source().unwrap(), "// first");

        std::fs::write(&path, "// second").unwrap();
        assert_eq!(source.combined_source().unwrap(), "// second");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_builder_defaults() {
        let source = KernelSource::default().with_label("Iso Kernel");
        assert_eq!(source.entry_point(), "main");
        assert_eq!(source.label(), Some("Iso Kernel"));
        assert!(source.fragments().is_empty());
    }
}
