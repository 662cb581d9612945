use crate::codes::{self, ErrorCode};
use std::fmt;
use tracing::error;

/// Scan backends the bridge can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanProduct {
    BlackDuckSca,
    Coverity,
    Polaris,
    Srm,
}

impl ScanProduct {
    pub fn all() -> &'static [ScanProduct] {
        &[
            ScanProduct::BlackDuckSca,
            ScanProduct::Coverity,
            ScanProduct::Polaris,
            ScanProduct::Srm,
        ]
    }

    /// Case-insensitive lookup; `blackduck` is accepted as an alias
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "blackducksca" | "blackduck" => Some(ScanProduct::BlackDuckSca),
            "coverity" => Some(ScanProduct::Coverity),
            "polaris" => Some(ScanProduct::Polaris),
            "srm" => Some(ScanProduct::Srm),
            _ => None,
        }
    }

    /// Canonical upper-case name stored in the raw map
    pub fn name(&self) -> &'static str {
        match self {
            ScanProduct::BlackDuckSca => "BLACKDUCKSCA",
            ScanProduct::Coverity => "COVERITY",
            ScanProduct::Polaris => "POLARIS",
            ScanProduct::Srm => "SRM",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScanProduct::BlackDuckSca => "Black Duck SCA",
            ScanProduct::Coverity => "Coverity on Polaris or Coverity Connect",
            ScanProduct::Polaris => "Polaris",
            ScanProduct::Srm => "Software Risk Manager",
        }
    }

    /// Bridge stage that runs a scan for this product
    pub fn stage(&self) -> &'static str {
        match self {
            ScanProduct::BlackDuckSca => "blackducksca",
            ScanProduct::Coverity => "connect",
            ScanProduct::Polaris => "polaris",
            ScanProduct::Srm => "srm",
        }
    }

    pub fn invalid_parameters_code(&self) -> ErrorCode {
        match self {
            ScanProduct::BlackDuckSca => codes::INVALID_BLACKDUCKSCA_PARAMETERS,
            ScanProduct::Coverity => codes::INVALID_COVERITY_PARAMETERS,
            ScanProduct::Polaris => codes::INVALID_POLARIS_PARAMETERS,
            ScanProduct::Srm => codes::INVALID_SRM_PARAMETERS,
        }
    }
}

impl fmt::Display for ScanProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Whether `name` selects a supported product; logs the rejection otherwise.
/// The form placeholder `Select` counts as no product.
pub fn validate_product(name: &str) -> bool {
    let valid = !name.trim().eq_ignore_ascii_case("select") && ScanProduct::from_name(name).is_some();
    if !valid {
        let supported: Vec<&str> = ScanProduct::all().iter().map(|p| p.stage()).collect();
        error!(
            "Invalid Security Product '{}'. Supported products: {}",
            name,
            supported.join(", ")
        );
    }
    valid
}
