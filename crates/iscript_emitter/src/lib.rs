//! iscript_emitter: output file handling.
//!
//! Computes where generated JavaScript lands (a `.js` sibling of the input
//! by default, or under an output directory override) and writes the output
//! files. The emitter performs the only file writes in the pipeline.

use std::path::{Path, PathBuf};

/// The emitter produces output files from generated script text.
pub struct Emitter {
    /// Output directory override. When unset, output lands next to the
    /// source file.
    pub out_dir: Option<PathBuf>,
}

/// The result of emitting one source file.
pub struct EmitResult {
    /// The generated JavaScript content.
    pub js_content: String,
    /// Output file paths and contents.
    pub output_files: Vec<OutputFile>,
}

/// A file produced by the emitter.
#[derive(Debug, Clone)]
pub struct OutputFile {
    /// The output file path.
    pub path: PathBuf,
    /// The content of the file.
    pub text: String,
}

impl Emitter {
    pub fn new() -> Self {
        Self { out_dir: None }
    }

    /// Build the emit result for one source file's generated text.
    pub fn emit(&self, source_path: &Path, js_content: String) -> EmitResult {
        let js_path = self.get_output_path(source_path, "js");
        self.emit_to(js_path, js_content)
    }

    /// Build an emit result targeting an explicit output path.
    pub fn emit_to(&self, path: PathBuf, js_content: String) -> EmitResult {
        let output_files = vec![OutputFile {
            path,
            text: js_content.clone(),
        }];
        EmitResult {
            js_content,
            output_files,
        }
    }

    /// Write output files to disk.
    pub fn write_output_files(&self, result: &EmitResult) -> std::io::Result<()> {
        for file in &result.output_files {
            if let Some(parent) = file.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&file.path, &file.text)?;
        }
        Ok(())
    }

    /// The output path for `source` with the given extension: a sibling of
    /// the source by default, or the same basename under `out_dir`.
    pub fn get_output_path(&self, source: &Path, ext: &str) -> PathBuf {
        let stem = source.file_stem().unwrap_or_default();
        let base_dir = if let Some(ref out_dir) = self.out_dir {
            out_dir.clone()
        } else {
            source
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf()
        };
        base_dir.join(format!("{}.{}", stem.to_string_lossy(), ext))
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_is_sibling() {
        let emitter = Emitter::new();
        let path = emitter.get_output_path(Path::new("src/app.isc"), "js");
        assert_eq!(path, PathBuf::from("src/app.js"));
    }

    #[test]
    fn test_output_path_with_outdir() {
        let mut emitter = Emitter::new();
        emitter.out_dir = Some(PathBuf::from("dist"));
        let path = emitter.get_output_path(Path::new("src/app.isc"), "js");
        assert_eq!(path, PathBuf::from("dist/app.js"));
    }

    #[test]
    fn test_output_path_without_parent() {
        let emitter = Emitter::new();
        let path = emitter.get_output_path(Path::new("app.isc"), "js");
        assert_eq!(path, PathBuf::from("app.js"));
    }

    #[test]
    fn test_emit_to_explicit_path() {
        let emitter = Emitter::new();
        let result = emitter.emit_to(PathBuf::from("nested/dir/out.js"), "x;\n".to_string());
        assert_eq!(result.output_files[0].path, PathBuf::from("nested/dir/out.js"));
        assert_eq!(result.output_files[0].text, "x;\n");
    }

    #[test]
    fn test_emit_result_carries_content() {
        let emitter = Emitter::new();
        let result = emitter.emit(Path::new("a.isc"), "console.log(1);\n".to_string());
        assert_eq!(result.js_content, "console.log(1);\n");
        assert_eq!(result.output_files.len(), 1);
        assert_eq!(result.output_files[0].path, PathBuf::from("a.js"));
    }
}
