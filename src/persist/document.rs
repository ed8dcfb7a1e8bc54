use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Error, Result};

/// JSON persistence shared by [`Matrix`](crate::Matrix) and
/// [`NeuralNetwork`](crate::NeuralNetwork).
///
/// Every parse failure, whether syntactic or a shape inconsistency caught by
/// the implementing type, surfaces as `ErrorKind::ParseError`.
pub trait Document: Serialize + DeserializeOwned + Sized {
    /// Compact canonical text.
    fn dump(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::Serialize)
    }

    fn dump_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Error::Serialize)
    }

    fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(parse_error)
    }

    /// Reconstructs from an already parsed JSON tree.
    fn from_value(value: &Value) -> Result<Self> {
        Self::deserialize(value).map_err(parse_error)
    }

    /// Parses a stream of documents, where any top-level array is flattened
    /// into its elements. Order and duplicates are preserved.
    fn parse_many(text: &str) -> Result<Vec<Self>> {
        let mut docs = Vec::new();

        for value in serde_json::Deserializer::from_str(text).into_iter::<Value>() {
            match value.map_err(parse_error)? {
                Value::Array(items) => {
                    for item in &items {
                        docs.push(Self::from_value(item)?);
                    }
                }
                other => docs.push(Self::from_value(&other)?),
            }
        }

        Ok(docs)
    }

    /// Writes pretty-printed JSON to `path`.
    ///
    /// The document is rendered before the file is opened, so a value that
    /// cannot be written leaves `path` untouched.
    fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = self.dump_pretty()?;
        std::fs::write(path, text)?;
        tracing::debug!(path = %path.display(), "saved document");
        Ok(())
    }

    fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let doc = serde_json::from_reader(reader).map_err(parse_error)?;
        tracing::debug!(path = %path.display(), "loaded document");
        Ok(doc)
    }

    /// Loads every document in `path`, see [`Document::parse_many`].
    fn load_all_json<P: AsRef<Path>>(path: P) -> Result<Vec<Self>> {
        let path = path.as_ref();
        let mut text = String::new();
        BufReader::new(File::open(path)?).read_to_string(&mut text)?;
        let docs = Self::parse_many(&text)?;
        tracing::debug!(path = %path.display(), count = docs.len(), "loaded documents");
        Ok(docs)
    }
}

fn parse_error(err: serde_json::Error) -> Error {
    // Read failures inside from_reader come back wrapped in serde_json::Error.
    if err.is_io() {
        return Error::Io(err.into());
    }
    Error::Parse(err.to_string())
}
