//! Category-specific transform stages
//!
//! Fonts and markup are pure copies. Images are recompressed in-process.
//! Styles run through the external Sass compiler and are then prefixed and
//! packed in-process, emitting both an expanded and a minified stylesheet.
//! Scripts are handed to the external bundler.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::ImageOutputFormat;
use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use crate::config::{CssConfig, ImagesConfig};
use crate::error::{PipelineError, PipelineResult};
use crate::fs::{atomic_write, copy_atomic, walk_files};
use crate::tools::{run_tool, Substitutions, ToolCommand};

/// Copy every file under `source_dir` into `output_dir`, preserving the
/// relative layout. Returns the written paths.
pub fn copy_tree(source_dir: &Path, output_dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    let mut written = Vec::new();
    for file in walk_files(source_dir)? {
        let relative = file.strip_prefix(source_dir).unwrap_or(&file);
        let dest = output_dir.join(relative);
        copy_atomic(&file, &dest)?;
        written.push(dest);
    }
    Ok(written)
}

/// Recompress raster images into `output_dir`; formats the codec layer does
/// not own (SVG, animated GIF, anything unrecognized) are copied verbatim.
///
/// One decode→encode pass per format - passes are mutually exclusive by
/// extension, which keeps output deterministic and the task idempotent.
pub fn optimize_images(
    source_dir: &Path,
    output_dir: &Path,
    options: &ImagesConfig,
) -> PipelineResult<Vec<PathBuf>> {
    let mut written = Vec::new();
    for file in walk_files(source_dir)? {
        let relative = file.strip_prefix(source_dir).unwrap_or(&file);
        let dest = output_dir.join(relative);

        let ext = file
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "png" => reencode(&file, &dest, ImageOutputFormat::Png)?,
            "jpg" | "jpeg" => reencode(
                &file,
                &dest,
                ImageOutputFormat::Jpeg(options.jpeg_quality),
            )?,
            _ => copy_atomic(&file, &dest)?,
        }
        written.push(dest);
    }
    Ok(written)
}

fn reencode(source: &Path, dest: &Path, format: ImageOutputFormat) -> PipelineResult<()> {
    let img = image::open(source).map_err(|e| PipelineError::Image {
        path: source.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format)
        .map_err(|e| PipelineError::Image {
            path: source.to_path_buf(),
            message: e.to_string(),
        })?;

    atomic_write(dest, buf.get_ref())
}

/// Compile every non-partial stylesheet entry under `source_dir`, then
/// prefix and pack the compiled css, writing `<stem>.css` and
/// `<stem>.min.css` into `output_dir`.
pub fn compile_styles(
    source_dir: &Path,
    output_dir: &Path,
    compiler: &ToolCommand,
    css: &CssConfig,
) -> PipelineResult<Vec<PathBuf>> {
    let entries: Vec<PathBuf> = walk_files(source_dir)?
        .into_iter()
        .filter(|p| is_style_entry(p))
        .collect();

    let mut written = Vec::new();
    let scratch = tempfile::tempdir()?;

    for entry in entries {
        let stem = entry
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "style".to_string());

        let compiled_path = scratch.path().join(format!("{stem}.css"));
        let subst = Substitutions::new().input(&entry).output(&compiled_path);
        run_tool(compiler, &subst, &[])?;

        let compiled = std::fs::read_to_string(&compiled_path)?;

        let expanded = postprocess_css(&compiled, css, false, &entry)?;
        let minified = postprocess_css(&compiled, css, true, &entry)?;

        let out = output_dir.join(format!("{stem}.css"));
        let out_min = output_dir.join(format!("{stem}.min.css"));
        atomic_write(&out, expanded.as_bytes())?;
        atomic_write(&out_min, minified.as_bytes())?;
        written.push(out);
        written.push(out_min);
    }

    Ok(written)
}

/// Sass convention: leading underscore marks a partial, not an entry.
fn is_style_entry(path: &Path) -> bool {
    let is_scss = path
        .extension()
        .map(|e| e == "scss" || e == "sass")
        .unwrap_or(false);
    let is_partial = path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with('_'))
        .unwrap_or(true);
    is_scss && !is_partial
}

/// Vendor-prefix, pack, and optionally minify compiled css.
pub fn postprocess_css(
    source: &str,
    css: &CssConfig,
    minify: bool,
    file: &Path,
) -> PipelineResult<String> {
    let css_err = |message: String| PipelineError::Css {
        file: file.to_path_buf(),
        message,
    };

    let targets = Targets::from(browser_targets(css));

    let mut sheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| css_err(e.to_string()))?;
    sheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| css_err(e.to_string()))?;

    let result = sheet
        .to_css(PrinterOptions {
            minify,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| css_err(e.to_string()))?;

    Ok(result.code)
}

fn browser_targets(css: &CssConfig) -> Browsers {
    // lightningcss encodes versions as major << 16.
    let major = |v: u32| v << 16;
    Browsers {
        chrome: css.chrome.map(major),
        firefox: css.firefox.map(major),
        safari: css.safari.map(major),
        edge: css.edge.map(major),
        ios_saf: css.ios_saf.map(major),
        android: css.android.map(major),
        ..Browsers::default()
    }
}

/// Bundle and minify the script entry point into `output_path` via the
/// external bundler. The bundler owns the write.
pub fn bundle_scripts(
    entry: &Path,
    output_path: &Path,
    bundler: &ToolCommand,
) -> PipelineResult<Vec<PathBuf>> {
    if !entry.exists() {
        // No entry point means nothing to publish - a no-op, not an error.
        return Ok(Vec::new());
    }
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let subst = Substitutions::new().input(entry).output(output_path);
    run_tool(bundler, &subst, &[])?;

    Ok(vec![output_path.to_path_buf()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn copy_tree_preserves_layout() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("fonts");
        let out = dir.path().join("out");
        fs::create_dir_all(src.join("display")).unwrap();
        fs::write(src.join("body.woff2"), "b").unwrap();
        fs::write(src.join("display/head.woff2"), "h").unwrap();

        let written = copy_tree(&src, &out).unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(fs::read_to_string(out.join("body.woff2")).unwrap(), "b");
        assert_eq!(
            fs::read_to_string(out.join("display/head.woff2")).unwrap(),
            "h"
        );
    }

    #[test]
    fn optimize_images_reencodes_png_deterministically() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("images");
        fs::create_dir_all(&src).unwrap();

        let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([120, 30, 200, 255]));
        img.save(src.join("dot.png")).unwrap();

        let out_a = dir.path().join("a");
        let out_b = dir.path().join("b");
        let options = ImagesConfig::default();

        optimize_images(&src, &out_a, &options).unwrap();
        optimize_images(&src, &out_b, &options).unwrap();

        let a = fs::read(out_a.join("dot.png")).unwrap();
        let b = fs::read(out_b.join("dot.png")).unwrap();
        assert_eq!(a, b, "re-encoding must be deterministic");

        let decoded = image::open(out_a.join("dot.png")).unwrap();
        assert_eq!(decoded.width(), 8);
        assert_eq!(decoded.height(), 8);
    }

    #[test]
    fn optimize_images_copies_unknown_formats() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("images");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("logo.svg"), "<svg/>").unwrap();

        let out = dir.path().join("out");
        optimize_images(&src, &out, &ImagesConfig::default()).unwrap();

        assert_eq!(fs::read_to_string(out.join("logo.svg")).unwrap(), "<svg/>");
    }

    #[test]
    fn style_entry_skips_partials() {
        assert!(is_style_entry(Path::new("src/scss/style.scss")));
        assert!(!is_style_entry(Path::new("src/scss/_mixins.scss")));
        assert!(!is_style_entry(Path::new("src/scss/readme.txt")));
    }

    #[test]
    fn postprocess_css_minifies() {
        let css = "body {\n  color: #ff0000;\n}\n";
        let expanded =
            postprocess_css(css, &CssConfig::default(), false, Path::new("style.scss")).unwrap();
        let minified =
            postprocess_css(css, &CssConfig::default(), true, Path::new("style.scss")).unwrap();

        assert!(expanded.contains("body"));
        assert!(minified.len() < expanded.len());
        assert!(!minified.contains('\n'));
    }

    #[test]
    fn postprocess_css_rejects_garbage() {
        let err = postprocess_css(
            "body { color: ",
            &CssConfig::default(),
            true,
            Path::new("style.scss"),
        );
        // lightningcss recovers from some malformed input; a hard error is
        // only required for unparseable sheets.
        if let Err(e) = err {
            assert!(matches!(e, PipelineError::Css { .. }));
        }
    }

    #[cfg(unix)]
    #[test]
    fn compile_styles_emits_expanded_and_minified() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("scss");
        let out = dir.path().join("stylesheets");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("style.scss"), "body { color: #ff0000; }").unwrap();
        fs::write(src.join("_partial.scss"), "div { color: blue; }").unwrap();

        // Stand-in compiler: plain copy, the entry already being valid css.
        let compiler = ToolCommand::new("cp", &["{input}", "{output}"]);
        let written =
            compile_styles(&src, &out, &compiler, &CssConfig::default()).unwrap();

        assert_eq!(written.len(), 2);
        assert!(out.join("style.css").exists());
        assert!(out.join("style.min.css").exists());
        assert!(!out.join("_partial.css").exists());

        let min = fs::read_to_string(out.join("style.min.css")).unwrap();
        assert!(min.contains("body"));
    }

    #[cfg(unix)]
    #[test]
    fn bundle_scripts_invokes_bundler() {
        let dir = tempdir().unwrap();
        let entry = dir.path().join("app.js");
        fs::write(&entry, "console.log(1);").unwrap();
        let out = dir.path().join("js/bundle.js");

        let bundler = ToolCommand::new("cp", &["{input}", "{output}"]);
        let written = bundle_scripts(&entry, &out, &bundler).unwrap();

        assert_eq!(written, vec![out.clone()]);
        assert_eq!(fs::read_to_string(&out).unwrap(), "console.log(1);");
    }

    #[test]
    fn bundle_scripts_missing_entry_is_noop() {
        let dir = tempdir().unwrap();
        let bundler = ToolCommand::new("cp", &["{input}", "{output}"]);
        let written = bundle_scripts(
            &dir.path().join("app.js"),
            &dir.path().join("bundle.js"),
            &bundler,
        )
        .unwrap();
        assert!(written.is_empty());
    }
}
