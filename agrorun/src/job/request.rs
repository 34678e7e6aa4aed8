//! The JSON job event.

use crate::errors::{AgrorunError, Result};
use crate::staging::{InputFile, InputSource};
use crate::storage::ObjectLocation;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Where one entry of `input_files` comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileSource {
    /// `{"s3_bucket": ..., "s3_key": ...}`
    Stored {
        /// Source bucket.
        s3_bucket: String,
        /// Source key.
        s3_key: String,
    },
    /// `{"base64_content": ...}`
    Encoded {
        /// Base64 file content.
        base64_content: String,
    },
    /// A bare base64 string.
    Base64(String),
}

/// How artifacts are returned inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Archive only.
    #[default]
    Zip,
    /// Archive plus an inline listing of every artifact.
    IndividualFiles,
}

/// One simulation job, as received from a caller.
///
/// Exactly one input shape is used; see [`JobRequest::input_source`] for the
/// precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    /// Caller-chosen id; generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation_id: Option<String>,
    /// Named files, each inline or stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_files: Option<IndexMap<String, FileSource>>,
    /// Named files as base64 strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub individual_files: Option<IndexMap<String, String>>,
    /// Named files as base64 strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_content: Option<IndexMap<String, String>>,
    /// A base64 zip archive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_b64: Option<String>,
    /// Bucket of a stored input archive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_input_bucket: Option<String>,
    /// Key of a stored input archive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_input_key: Option<String>,
    /// Module override for this job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_code: Option<String>,
    /// Output names to return, in priority order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_outputs: Option<Vec<String>>,
    /// Bucket receiving the results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_output_bucket: Option<String>,
    /// Key prefix for the results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_output_prefix: Option<String>,
    /// Also upload each artifact on its own.
    #[serde(default)]
    pub unzip_outputs: bool,
    /// Return the archive as base64; defaults to true without storage output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_zip_b64: Option<bool>,
    /// Inline listing format.
    #[serde(default)]
    pub output_format: OutputFormat,
}

impl JobRequest {
    /// Parses a JSON event.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// A request with inline files, in the given order.
    #[must_use]
    pub fn with_files<N, C>(files: impl IntoIterator<Item = (N, C)>) -> Self
    where
        N: Into<String>,
        C: AsRef<[u8]>,
    {
        let input_files = files
            .into_iter()
            .map(|(name, content)| (name.into(), FileSource::Base64(STANDARD.encode(content))))
            .collect();
        Self {
            input_files: Some(input_files),
            ..Self::default()
        }
    }

    /// A request with an inline zip archive.
    #[must_use]
    pub fn with_archive(bytes: &[u8]) -> Self {
        Self {
            zip_b64: Some(STANDARD.encode(bytes)),
            ..Self::default()
        }
    }

    /// Sets the simulation id.
    #[must_use]
    pub fn with_simulation_id(mut self, id: impl Into<String>) -> Self {
        self.simulation_id = Some(id.into());
        self
    }

    /// Sets the module override.
    #[must_use]
    pub fn with_module_code(mut self, code: impl Into<String>) -> Self {
        self.module_code = Some(code.into());
        self
    }

    /// Sets the output priority list.
    #[must_use]
    pub fn with_return_outputs(mut self, outputs: Vec<String>) -> Self {
        self.return_outputs = Some(outputs);
        self
    }

    /// Sends results to object storage.
    #[must_use]
    pub fn with_storage_output(mut self, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.s3_output_bucket = Some(bucket.into());
        self.s3_output_prefix = Some(prefix.into());
        self
    }

    /// Sets the inline output format.
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Resolves the job input. The first present shape wins, in this order:
    /// `input_files`, `individual_files`, `files_content`, a non-empty
    /// `zip_b64`, then `s3_input_bucket` with `s3_input_key`.
    pub fn input_source(&self) -> Result<InputSource> {
        if let Some(files) = &self.input_files {
            let inputs = files
                .iter()
                .map(|(name, source)| -> Result<InputFile> {
                    match source {
                        FileSource::Stored { s3_bucket, s3_key } => Ok(InputFile::stored(
                            name.clone(),
                            ObjectLocation::new(s3_bucket.clone(), s3_key.clone()),
                        )),
                        FileSource::Encoded { base64_content: b64 } | FileSource::Base64(b64) => {
                            Ok(InputFile::inline(name.clone(), decode(name, b64)?))
                        }
                    }
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(InputSource::Files(inputs));
        }

        if let Some(files) = self.individual_files.as_ref().or(self.files_content.as_ref()) {
            let inputs = files
                .iter()
                .map(|(name, b64)| -> Result<InputFile> {
                    Ok(InputFile::inline(name.clone(), decode(name, b64)?))
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(InputSource::Files(inputs));
        }

        if let Some(b64) = self.zip_b64.as_deref().filter(|s| !s.is_empty()) {
            return Ok(InputSource::Archive(decode("zip_b64", b64)?));
        }

        if let (Some(bucket), Some(key)) = (&self.s3_input_bucket, &self.s3_input_key) {
            return Ok(InputSource::StoredArchive(ObjectLocation::new(bucket.clone(), key.clone())));
        }

        Err(AgrorunError::invalid_input("No valid input method provided"))
    }

    /// Returns the trimmed module override, if non-blank.
    #[must_use]
    pub fn module_override(&self) -> Option<&str> {
        self.module_code.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    /// Returns `(bucket, prefix)` when results go to object storage.
    #[must_use]
    pub fn storage_output(&self) -> Option<(&str, &str)> {
        match (&self.s3_output_bucket, &self.s3_output_prefix) {
            (Some(bucket), Some(prefix)) => Some((bucket.as_str(), prefix.as_str())),
            _ => None,
        }
    }
}

fn decode(name: &str, b64: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(b64.trim())
        .map_err(|e| AgrorunError::invalid_input(format!("{name}: payload is not valid base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::Payload;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_input_files_in_order() {
        let request = JobRequest::from_json(
            r#"{
                "input_files": {
                    "UFGA8201.MZX": "YWJj",
                    "UFGA8201.WTH": {"base64_content": "d3Ro"},
                    "IB.SOL": {"s3_bucket": "in", "s3_key": "soils/IB.SOL"}
                }
            }"#,
        )
        .unwrap();

        let InputSource::Files(files) = request.input_source().unwrap() else {
            panic!("expected files");
        };
        assert_eq!(
            files,
            vec![
                InputFile::inline("UFGA8201.MZX", "abc"),
                InputFile::inline("UFGA8201.WTH", "wth"),
                InputFile {
                    name: "IB.SOL".into(),
                    payload: Payload::Stored(ObjectLocation::new("in", "soils/IB.SOL")),
                },
            ]
        );
    }

    #[test]
    fn test_input_precedence() {
        let request = JobRequest::from_json(
            r#"{"files_content": {"A.MZX": "YQ=="}, "zip_b64": "UEs=", "s3_input_bucket": "b", "s3_input_key": "k"}"#,
        )
        .unwrap();
        assert_eq!(request.input_source().unwrap().label(), "files");

        let request = JobRequest::from_json(r#"{"zip_b64": "", "s3_input_bucket": "b", "s3_input_key": "k"}"#).unwrap();
        assert_eq!(
            request.input_source().unwrap(),
            InputSource::StoredArchive(ObjectLocation::new("b", "k"))
        );
    }

    #[test]
    fn test_individual_files_input() {
        let request = JobRequest::from_json(r#"{"individual_files": {"A.MZX": "YQ=="}}"#).unwrap();
        assert_eq!(
            request.input_source().unwrap(),
            InputSource::Files(vec![InputFile::inline("A.MZX", "a")])
        );
    }

    #[test]
    fn test_missing_input_is_setup_error() {
        let err = JobRequest::from_json(r#"{"s3_input_bucket": "only-bucket"}"#)
            .unwrap()
            .input_source()
            .unwrap_err();
        assert_eq!(err.kind(), "SETUP_INPUT");
        assert!(err.to_string().contains("No valid input method provided"));
    }

    #[test]
    fn test_bad_base64_names_the_file() {
        let err = JobRequest::from_json(r#"{"files_content": {"A.MZX": "***"}}"#)
            .unwrap()
            .input_source()
            .unwrap_err();
        assert_eq!(err.kind(), "SETUP_INPUT");
        assert!(err.to_string().contains("A.MZX"));
    }

    #[test]
    fn test_options() {
        let request = JobRequest::from_json(
            r#"{"module_code": "  ", "s3_output_bucket": "out", "s3_output_prefix": "runs/1/",
                "output_format": "individual_files", "unzip_outputs": true}"#,
        )
        .unwrap();
        assert_eq!(request.module_override(), None);
        assert_eq!(request.storage_output(), Some(("out", "runs/1/")));
        assert_eq!(request.output_format, OutputFormat::IndividualFiles);
        assert!(request.unzip_outputs);
        assert_eq!(request.return_zip_b64, None);
    }

    #[test]
    fn test_builders_round_trip_through_json() {
        let request = JobRequest::with_files([("A.MZX", "abc")])
            .with_simulation_id("sim-0000abcd")
            .with_module_code("MZCER048");
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(JobRequest::from_json(&json).unwrap(), request);
    }
}
