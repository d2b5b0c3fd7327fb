use bytes::Bytes;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Output flavour requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// General-purpose CSV.
    Csv,
    /// CSV laid out for import into Busy accounting software.
    Excel,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Csv, OutputFormat::Excel];

    /// Parse the multipart `format` field. An absent or empty value means CSV.
    pub fn from_field(value: Option<&str>) -> Result<Self, UnknownFormat> {
        match value {
            None | Some("") => Ok(OutputFormat::Csv),
            Some(v) => v.parse(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Excel => "excel",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "CSV conversion completed successfully",
            OutputFormat::Excel => "Excel (Busy) format conversion completed successfully",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Excel => "xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "text/csv; charset=utf-8",
            OutputFormat::Excel => "application/vnd.ms-excel",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(OutputFormat::Csv),
            "excel" => Ok(OutputFormat::Excel),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

/// An image received from the caller, before validation.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    /// MIME type declared by the client for the part.
    pub mime_type: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Browsers submit an empty, nameless part when no file was chosen.
    pub fn is_blank(&self) -> bool {
        self.bytes.is_empty() && self.file_name.as_deref().unwrap_or("").is_empty()
    }
}

/// Successful conversion body: exactly one of `csv` / `excel` plus a message.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConvertResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excel: Option<String>,
    pub message: String,
}

impl ConvertResponse {
    pub fn new(format: OutputFormat, content: String) -> Self {
        let (csv, excel) = match format {
            OutputFormat::Csv => (Some(content), None),
            OutputFormat::Excel => (None, Some(content)),
        };

        Self {
            csv,
            excel,
            message: format.success_message().to_string(),
        }
    }
}

/// Self-description served on `GET /api/convert-image`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiInfo {
    pub endpoint: &'static str,
    pub method: &'static str,
    pub formats: Vec<OutputFormat>,
    pub accepted_mime_types: Vec<&'static str>,
    pub max_file_size_bytes: usize,
    pub timeout_seconds: u64,
}
