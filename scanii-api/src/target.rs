//! Regional, versioned endpoints for the Scanii API.
//!
//! A [`ScaniiTarget`] selects both the API version and the data-center the
//! client talks to. Standard targets resolve through a static table; custom
//! targets carry their own base URL (private deployments, mock servers).

use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::ScaniiError;

/// Scanii data-center regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaniiRegion {
    /// Geo-balanced endpoint - api.scanii.com
    Auto,
    /// United States - api-us1.scanii.com
    Us1,
    /// Europe (Ireland) - api-eu1.scanii.com
    Eu1,
    /// Europe (Germany) - api-eu2.scanii.com
    Eu2,
    /// Asia Pacific (Australia) - api-ap1.scanii.com
    Ap1,
    /// Asia Pacific (Singapore) - api-ap2.scanii.com
    Ap2,
}

impl ScaniiRegion {
    const ALL: [ScaniiRegion; 6] = [
        ScaniiRegion::Auto,
        ScaniiRegion::Us1,
        ScaniiRegion::Eu1,
        ScaniiRegion::Eu2,
        ScaniiRegion::Ap1,
        ScaniiRegion::Ap2,
    ];

    fn host(self) -> &'static str {
        match self {
            ScaniiRegion::Auto => "api.scanii.com",
            ScaniiRegion::Us1 => "api-us1.scanii.com",
            ScaniiRegion::Eu1 => "api-eu1.scanii.com",
            ScaniiRegion::Eu2 => "api-eu2.scanii.com",
            ScaniiRegion::Ap1 => "api-ap1.scanii.com",
            ScaniiRegion::Ap2 => "api-ap2.scanii.com",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ScaniiRegion::Auto => "auto",
            ScaniiRegion::Us1 => "us1",
            ScaniiRegion::Eu1 => "eu1",
            ScaniiRegion::Eu2 => "eu2",
            ScaniiRegion::Ap1 => "ap1",
            ScaniiRegion::Ap2 => "ap2",
        }
    }
}

/// Scanii REST API versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    V2_0,
    V2_1,
}

impl ApiVersion {
    fn as_str(self) -> &'static str {
        match self {
            ApiVersion::V2_0 => "v2.0",
            ApiVersion::V2_1 => "v2.1",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TargetKind {
    Standard {
        region: ScaniiRegion,
        version: ApiVersion,
    },
    Custom(String),
}

/// A (region, API version) selector, or a custom base URL.
///
/// # Examples
///
/// ```
/// use scanii::ScaniiTarget;
///
/// let target: ScaniiTarget = "v2.1-eu1".parse().unwrap();
/// assert_eq!(target, ScaniiTarget::V21_EU1);
/// assert_eq!(
///     target.resolve().unwrap().as_str(),
///     "https://api-eu1.scanii.com/v2.1"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScaniiTarget {
    kind: TargetKind,
}

impl ScaniiTarget {
    pub const V20: Self = Self::new(ScaniiRegion::Auto, ApiVersion::V2_0);
    pub const V21: Self = Self::new(ScaniiRegion::Auto, ApiVersion::V2_1);
    pub const V20_US1: Self = Self::new(ScaniiRegion::Us1, ApiVersion::V2_0);
    pub const V21_US1: Self = Self::new(ScaniiRegion::Us1, ApiVersion::V2_1);
    pub const V20_EU1: Self = Self::new(ScaniiRegion::Eu1, ApiVersion::V2_0);
    pub const V21_EU1: Self = Self::new(ScaniiRegion::Eu1, ApiVersion::V2_1);
    pub const V20_EU2: Self = Self::new(ScaniiRegion::Eu2, ApiVersion::V2_0);
    pub const V21_EU2: Self = Self::new(ScaniiRegion::Eu2, ApiVersion::V2_1);
    pub const V20_AP1: Self = Self::new(ScaniiRegion::Ap1, ApiVersion::V2_0);
    pub const V21_AP1: Self = Self::new(ScaniiRegion::Ap1, ApiVersion::V2_1);
    pub const V20_AP2: Self = Self::new(ScaniiRegion::Ap2, ApiVersion::V2_0);
    pub const V21_AP2: Self = Self::new(ScaniiRegion::Ap2, ApiVersion::V2_1);

    /// Target for a standard region and API version.
    #[must_use]
    pub const fn new(region: ScaniiRegion, version: ApiVersion) -> Self {
        Self {
            kind: TargetKind::Standard { region, version },
        }
    }

    /// Target pointing at an arbitrary base URL.
    ///
    /// The URL is only validated by [`ScaniiTarget::resolve`], which the
    /// client calls at construction time.
    #[must_use]
    pub fn custom(base_url: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Custom(base_url.into()),
        }
    }

    /// Every standard target, one per (region, version) pair.
    #[must_use]
    pub fn all() -> Vec<ScaniiTarget> {
        ScaniiRegion::ALL
            .iter()
            .flat_map(|&region| {
                [ApiVersion::V2_0, ApiVersion::V2_1]
                    .into_iter()
                    .map(move |version| Self::new(region, version))
            })
            .collect()
    }

    /// Region of a standard target, `None` for custom ones.
    #[must_use]
    pub fn region(&self) -> Option<ScaniiRegion> {
        match self.kind {
            TargetKind::Standard { region, .. } => Some(region),
            TargetKind::Custom(_) => None,
        }
    }

    /// API version of a standard target, `None` for custom ones.
    #[must_use]
    pub fn version(&self) -> Option<ApiVersion> {
        match self.kind {
            TargetKind::Standard { version, .. } => Some(version),
            TargetKind::Custom(_) => None,
        }
    }

    /// Resolve this target to its absolute base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::Configuration`] when a custom target is not an
    /// absolute `http`/`https` URL with a host.
    pub fn resolve(&self) -> Result<Url, ScaniiError> {
        let raw = match &self.kind {
            TargetKind::Standard { region, version } => {
                format!("https://{}/{}", region.host(), version.as_str())
            }
            TargetKind::Custom(base_url) => base_url.trim_end_matches('/').to_string(),
        };

        let url = Url::parse(&raw).map_err(|e| {
            ScaniiError::Configuration(format!("Invalid target URL '{raw}': {e}"))
        })?;

        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ScaniiError::Configuration(format!(
                "Target URL must be an absolute http(s) URL: {raw}"
            )));
        }

        Ok(url)
    }
}

impl Default for ScaniiTarget {
    fn default() -> Self {
        Self::V21
    }
}

impl fmt::Display for ScaniiTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TargetKind::Standard { region, version } => {
                write!(f, "{}-{}", version.as_str(), region.as_str())
            }
            TargetKind::Custom(base_url) => write!(f, "{base_url}"),
        }
    }
}

impl FromStr for ScaniiTarget {
    type Err = ScaniiError;

    /// Parse `auto`, `eu1`, `v2.0-ap2`, ... or an `http(s)://` base URL.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();

        if value.starts_with("http://") || value.starts_with("https://") {
            let target = Self::custom(value);
            target.resolve()?;
            return Ok(target);
        }

        let lowered = value.to_ascii_lowercase();
        let (version, region_str) = match lowered.split_once('-') {
            Some(("v2.0", rest)) => (ApiVersion::V2_0, rest),
            Some(("v2.1", rest)) => (ApiVersion::V2_1, rest),
            _ => (ApiVersion::V2_1, lowered.as_str()),
        };

        let region = ScaniiRegion::ALL
            .into_iter()
            .find(|region| region.as_str() == region_str)
            .ok_or_else(|| ScaniiError::Configuration(format!("Unknown Scanii target: '{s}'")))?;

        Ok(Self::new(region, version))
    }
}
