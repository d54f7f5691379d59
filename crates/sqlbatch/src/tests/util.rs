use alloc::{
    borrow::ToOwned,
    collections::BTreeMap,
    string::String,
    vec::Vec,
};

use thiserror::Error;

use crate::{PreprocessError, Preprocessor, PreprocessorOptions, ScriptLoader};

/// In-memory loader used throughout the unit tests.
#[derive(Debug, Default)]
pub(crate) struct MapLoader {
    scripts: BTreeMap<String, String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no script at \"{0}\"")]
pub(crate) struct MissingScript(pub(crate) String);

impl MapLoader {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(entries: &[(&str, &str)]) -> Self {
        let mut loader = Self::new();
        for (path, text) in entries {
            loader.insert(path, text);
        }
        loader
    }

    pub(crate) fn insert(&mut self, path: &str, text: &str) {
        self.scripts.insert(path.to_owned(), text.to_owned());
    }
}

impl ScriptLoader for MapLoader {
    type Error = MissingScript;

    fn load(&mut self, path: &str) -> Result<String, MissingScript> {
        self.scripts
            .get(path)
            .cloned()
            .ok_or_else(|| MissingScript(path.to_owned()))
    }
}

pub(crate) type TestError = PreprocessError<MissingScript>;

pub(crate) fn pre() -> Preprocessor<MapLoader> {
    Preprocessor::with_loader(MapLoader::new(), PreprocessorOptions::default())
}

pub(crate) fn pre_with(loader: MapLoader) -> Preprocessor<MapLoader> {
    Preprocessor::with_loader(loader, PreprocessorOptions::default())
}

/// Runs one script to completion, panicking on any error.
pub(crate) fn collect(pre: &mut Preprocessor<MapLoader>, script: &str) -> Vec<String> {
    pre.process(script)
        .map(|b| b.map(|cow| cow.into_owned()))
        .collect::<Result<_, _>>()
        .unwrap()
}

/// Runs one script with a fresh preprocessor and no variables.
pub(crate) fn run(script: &str) -> Vec<String> {
    collect(&mut pre(), script)
}

/// Runs one script and returns the error it ends in.
pub(crate) fn run_err(script: &str) -> TestError {
    let mut p = pre();
    for item in p.process(script) {
        if let Err(e) = item {
            return e;
        }
    }
    panic!("script completed without error");
}
