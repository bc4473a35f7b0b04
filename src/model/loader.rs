//! Loading models from files.

use super::error::ModelError;
use super::model::Model;
use std::path::{Path, PathBuf};

/// Errors raised by a [`ModelLoader`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: {message}")]
    Format {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("invalid model in '{path}': {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: ModelError,
    },
}

/// Builds a [`Model`] from a file in some model format (MPS, LP, ...).
///
/// The crate ships no format of its own; engines plug their readers in
/// here so tuning can be driven from files.
pub trait ModelLoader {
    fn load_model(&self, path: &Path) -> Result<Model, LoadError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VarKind;
    use std::io::Write;

    /// One variable per line: `name lower upper`.
    struct BoundsLoader;

    impl ModelLoader for BoundsLoader {
        fn load_model(&self, path: &Path) -> Result<Model, LoadError> {
            let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let mut model = Model::new(path.display().to_string());
            for (i, line) in text.lines().enumerate() {
                let fields: Vec<&str> = line.split_whitespace().collect();
                let format_err = |message: &str| LoadError::Format {
                    path: path.to_path_buf(),
                    line: i + 1,
                    message: message.to_string(),
                };
                let [name, lower, upper] = fields[..] else {
                    return Err(format_err("expected 'name lower upper'"));
                };
                let lower: f64 = lower.parse().map_err(|_| format_err("bad lower bound"))?;
                let upper: f64 = upper.parse().map_err(|_| format_err("bad upper bound"))?;
                model
                    .add_variable(lower, upper, VarKind::Continuous, name)
                    .map_err(|source| LoadError::Model {
                        path: path.to_path_buf(),
                        source,
                    })?;
            }
            Ok(model)
        }
    }

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("u_optmodel_{}_{name}", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_model() {
        let path = temp_file("ok.txt", "x -1 4\ny 0 inf\n");
        let model = BoundsLoader.load_model(&path).unwrap();
        assert_eq!(model.num_vars(), 2);
        let y = model.var_by_name("y").unwrap();
        assert!(model.variable(y).unwrap().upper.is_infinite());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_errors() {
        let missing = std::env::temp_dir().join("u_optmodel_does_not_exist.txt");
        assert!(matches!(
            BoundsLoader.load_model(&missing),
            Err(LoadError::Io { .. })
        ));

        let path = temp_file("bad.txt", "x 0 1\ny 0\n");
        assert!(matches!(
            BoundsLoader.load_model(&path),
            Err(LoadError::Format { line: 2, .. })
        ));
        std::fs::remove_file(path).ok();

        let path = temp_file("dup.txt", "x 0 1\nx 0 2\n");
        assert!(matches!(
            BoundsLoader.load_model(&path),
            Err(LoadError::Model { .. })
        ));
        std::fs::remove_file(path).ok();
    }
}
