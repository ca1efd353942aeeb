//! Output formats and layout engines accepted by the rendering backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported output format '{0}' (expected one of pdf, png, gif, jpeg, ps)")]
pub struct UnsupportedFormatError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported layout '{0}' (expected one of dot, neato, twopi, circo, fdp, sfdp)")]
pub struct UnsupportedLayoutError(pub String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pdf,
    Png,
    Gif,
    Jpeg,
    Ps,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Pdf,
        OutputFormat::Png,
        OutputFormat::Gif,
        OutputFormat::Jpeg,
        OutputFormat::Ps,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Png => "png",
            OutputFormat::Gif => "gif",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Ps => "ps",
        }
    }

    /// File extension of rendered output.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = UnsupportedFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        OutputFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == lower)
            .ok_or_else(|| UnsupportedFormatError(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Dot,
    Neato,
    Twopi,
    Circo,
    Fdp,
    Sfdp,
}

impl Layout {
    pub const ALL: [Layout; 6] = [
        Layout::Dot,
        Layout::Neato,
        Layout::Twopi,
        Layout::Circo,
        Layout::Fdp,
        Layout::Sfdp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Dot => "dot",
            Layout::Neato => "neato",
            Layout::Twopi => "twopi",
            Layout::Circo => "circo",
            Layout::Fdp => "fdp",
            Layout::Sfdp => "sfdp",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = UnsupportedLayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Layout::ALL
            .into_iter()
            .find(|l| l.as_str() == lower)
            .ok_or_else(|| UnsupportedLayoutError(s.to_string()))
    }
}
