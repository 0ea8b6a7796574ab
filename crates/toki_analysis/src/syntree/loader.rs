use std::fs;
use std::path::{Path, PathBuf};

use super::types::type_text;
use super::{BundleInfo, Project, SourceUnit};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Loads all host sources under the module root. Files under the bundle
/// directory (the configured relative path) feed the bundle identity and
/// are excluded from the analyzed units. Units are ordered by path so the
/// analysis output is deterministic.
pub fn load_project(module_root: &Path, bundle_rel: &Path) -> Result<Project, LoadError> {
    let root = fs::canonicalize(module_root).unwrap_or_else(|_| module_root.to_path_buf());
    let bundle_dir = root.join(bundle_rel);

    let mut files = Vec::new();
    collect_rs_files(&root, &mut files)?;

    let mut units = Vec::new();
    let mut bundle_files = Vec::new();
    for path in files {
        if path.starts_with(&bundle_dir) {
            bundle_files.push(path);
        } else {
            let source = read(&path)?;
            // Load errors are fatal; validate the syntax here so analysis
            // tasks can rely on parseable units.
            syn::parse_file(&source).map_err(|e| LoadError::Parse {
                path: path.clone(),
                message: e.to_string(),
            })?;
            let rel_path = path
                .strip_prefix(&root)
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_else(|_| path.to_string_lossy().into_owned());
            units.push(SourceUnit {
                path,
                rel_path,
                source,
            });
        }
    }

    let bundle = if bundle_files.is_empty() {
        None
    } else {
        Some(scan_bundle(&bundle_dir, &bundle_files)?)
    };

    Ok(Project {
        root,
        units,
        bundle,
    })
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn collect_rs_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), LoadError> {
    let entries = fs::read_dir(dir).map_err(|e| LoadError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let mut entries: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    entries.sort();
    for path in entries {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.is_dir() {
            if name == "target" || name.starts_with('.') {
                continue;
            }
            collect_rs_files(&path, out)?;
        } else if name.ends_with(".rs") {
            out.push(path);
        }
    }
    Ok(())
}

/// Reads the bundle module's identity: its `Reader` trait and `Gender`
/// type, struct shapes, reader-returning functions and the `TOKI_VERSION` /
/// `DEFAULT_LOCALE` constants.
fn scan_bundle(bundle_dir: &Path, files: &[PathBuf]) -> Result<BundleInfo, LoadError> {
    let module_name = bundle_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut info = BundleInfo {
        dir: bundle_dir.to_path_buf(),
        reader_type: format!("{module_name}::Reader"),
        gender_type: format!("{module_name}::Gender"),
        module_name,
        ..BundleInfo::default()
    };

    for path in files {
        let source = read(path)?;
        let ast = syn::parse_file(&source).map_err(|e| LoadError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        for item in &ast.items {
            match item {
                syn::Item::Const(item_const) => {
                    let name = item_const.ident.to_string();
                    if name != "TOKI_VERSION" && name != "DEFAULT_LOCALE" {
                        continue;
                    }
                    let syn::Expr::Lit(lit) = item_const.expr.as_ref() else {
                        continue;
                    };
                    let syn::Lit::Str(value) = &lit.lit else {
                        continue;
                    };
                    if name == "TOKI_VERSION" {
                        info.toki_version = value.value();
                    } else {
                        info.default_locale = value.value();
                    }
                }
                syn::Item::Struct(item_struct) => {
                    let syn::Fields::Named(fields) = &item_struct.fields else {
                        continue;
                    };
                    let shape: Vec<(String, String)> = fields
                        .named
                        .iter()
                        .filter_map(|f| {
                            f.ident
                                .as_ref()
                                .map(|ident| (ident.to_string(), type_text(&f.ty)))
                        })
                        .collect();
                    info.structs.insert(item_struct.ident.to_string(), shape);
                }
                syn::Item::Fn(item_fn) => {
                    if let syn::ReturnType::Type(_, ty) = &item_fn.sig.output {
                        if type_text(ty).contains("Reader") {
                            info.reader_fns.insert(item_fn.sig.ident.to_string());
                        }
                    }
                }
                _ => {}
            }
        }
    }

    Ok(info)
}
