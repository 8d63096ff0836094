//! Loading and validation of settings.
//!
//! Values defined in the configuration file can be overridden by environment variables. An
//! example of a configuration file can be found in the `configs/` directory located in the
//! repository root.

use std::{fmt, path::Path};

use config::{Config, ConfigError, Environment};
use serde::{
    de::{self, Deserializer, Visitor},
    Deserialize,
};
use thiserror::Error;
use tracing_subscriber::filter::EnvFilter;
use validator::{Validate, ValidationError, ValidationErrors};

use private_billing_core::{
    hiding::HidingParams,
    mask::{BoundType, GroupType, MaskConfig, ParticipantType},
};

#[derive(Error, Debug)]
/// An error related to loading and validation of settings.
pub enum SettingsError {
    #[error("configuration loading failed: {0}")]
    Loading(#[from] ConfigError),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

#[derive(Debug, Validate, Deserialize)]
/// The combined settings.
///
/// Each section in the configuration file corresponds to the identically named settings field.
pub struct Settings {
    #[validate]
    pub hiding: HidingSettings,
    #[validate]
    pub mask: MaskSettings,
    pub log: LoggingSettings,
}

impl Settings {
    /// Loads and validates the settings via a configuration file.
    ///
    /// # Errors
    /// Fails when the loading of the configuration file or its validation failed.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let settings: Settings = Self::load(path)?;
        settings.validate()?;
        Ok(settings)
    }

    fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Config::new();
        config.merge(config::File::from(path.as_ref()))?;
        config.merge(Environment::with_prefix("private_billing").separator("__"))?;
        config.try_into()
    }
}

/// The smallest supported polynomial degree.
const MIN_DEGREE: usize = 2048;
/// The largest supported polynomial degree.
const MAX_DEGREE: usize = 32768;
/// The range of supported bit sizes of a ciphertext modulus.
const MODULUS_BITS: std::ops::RangeInclusive<usize> = 20..=62;
/// The largest number of decimal places of encrypted values.
const MAX_HIDING_PRECISION: u8 = 5;
/// The smallest amount a single bill entry must be able to hold.
///
/// A bill carries the fixed point factor twice, hence its entries must stay below
/// `plaintext_modulus / (2 * 10^(2 * precision))`. That is about 56,295 for the default modulus
/// at precision 5 and about 562 at precision 6. Larger bills fail with `ValueOutOfRange`.
const MIN_BILL_CEILING: f64 = 10_000.0;

#[derive(Debug, Validate, Deserialize, Clone)]
#[validate(schema(function = "validate_hiding"))]
/// Settings of the homomorphic scheme.
///
/// Every client of a cycle must use the same settings.
pub struct HidingSettings {
    /// The polynomial degree, which is also the maximal length of a cycle. It must be a power
    /// of two between `2048` and `32768`.
    ///
    /// # Examples
    ///
    /// **TOML**
    /// ```text
    /// [hiding]
    /// degree = 16384
    /// ```
    ///
    /// **Environment variable**
    /// ```text
    /// PRIVATE_BILLING_HIDING__DEGREE=16384
    /// ```
    pub degree: usize,

    /// The bit sizes of the ciphertext moduli. Each size must be between `20` and `62` bits.
    /// More moduli allow for deeper computations at the expense of larger ciphertexts.
    ///
    /// # Examples
    ///
    /// **TOML**
    /// ```text
    /// [hiding]
    /// moduli_sizes = [62, 62, 62, 62, 62, 62]
    /// ```
    pub moduli_sizes: Vec<usize>,

    /// The plaintext modulus. It must be congruent to `1` modulo twice the degree and smaller
    /// than `2^62`.
    ///
    /// # Examples
    ///
    /// **TOML**
    /// ```text
    /// [hiding]
    /// plaintext_modulus = 1125899908022273
    /// ```
    ///
    /// **Environment variable**
    /// ```text
    /// PRIVATE_BILLING_HIDING__PLAINTEXT_MODULUS=1125899908022273
    /// ```
    pub plaintext_modulus: u64,

    /// The number of decimal places of encrypted values, between `1` and `5`. Together with the
    /// plaintext modulus it must leave room for bill entries of at least `10000`.
    ///
    /// # Examples
    ///
    /// **TOML**
    /// ```text
    /// [hiding]
    /// precision = 5
    /// ```
    ///
    /// **Environment variable**
    /// ```text
    /// PRIVATE_BILLING_HIDING__PRECISION=5
    /// ```
    pub precision: u8,
}

impl HidingSettings {
    /// Checks the hiding settings.
    fn validate_hiding(&self) -> Result<(), ValidationError> {
        self.validate_degree()?;
        self.validate_moduli()?;
        self.validate_plaintext_modulus()?;
        self.validate_precision()
    }

    fn validate_degree(&self) -> Result<(), ValidationError> {
        if self.degree.is_power_of_two() && (MIN_DEGREE..=MAX_DEGREE).contains(&self.degree) {
            Ok(())
        } else {
            Err(ValidationError::new("invalid polynomial degree"))
        }
    }

    fn validate_moduli(&self) -> Result<(), ValidationError> {
        if !self.moduli_sizes.is_empty()
            && self
                .moduli_sizes
                .iter()
                .all(|size| MODULUS_BITS.contains(size))
        {
            Ok(())
        } else {
            Err(ValidationError::new("invalid ciphertext moduli sizes"))
        }
    }

    /// Checks that the plaintext modulus enables slot packing.
    fn validate_plaintext_modulus(&self) -> Result<(), ValidationError> {
        if self.plaintext_modulus < 1 << 62
            && self.plaintext_modulus % (2 * self.degree as u64) == 1
        {
            Ok(())
        } else {
            Err(ValidationError::new("invalid plaintext modulus"))
        }
    }

    fn validate_precision(&self) -> Result<(), ValidationError> {
        if !(1..=MAX_HIDING_PRECISION).contains(&self.precision) {
            return Err(ValidationError::new("invalid hiding precision"));
        }
        if self.bill_ceiling() < MIN_BILL_CEILING {
            return Err(ValidationError::new("hiding precision leaves no room for bills"));
        }
        Ok(())
    }

    /// Gets the bound of the absolute value of a single bill entry.
    pub fn bill_ceiling(&self) -> f64 {
        (self.plaintext_modulus / 2) as f64 / 10_f64.powi(2 * self.precision as i32)
    }
}

/// A wrapper for validate derive.
fn validate_hiding(s: &HidingSettings) -> Result<(), ValidationError> {
    s.validate_hiding()
}

impl From<HidingSettings> for HidingParams {
    fn from(
        HidingSettings {
            degree,
            moduli_sizes,
            plaintext_modulus,
            precision,
        }: HidingSettings,
    ) -> Self {
        HidingParams {
            degree,
            moduli_sizes,
            plaintext_modulus,
            precision,
        }
    }
}

#[derive(Debug, Validate, Deserialize, Clone, Copy)]
#[validate(schema(function = "validate_mask"))]
/// Masking settings.
pub struct MaskSettings {
    /// The order of the finite group.
    ///
    /// # Examples
    ///
    /// **TOML**
    /// ```text
    /// [mask]
    /// group_type = "Power2"
    /// ```
    ///
    /// **Environment variable**
    /// ```text
    /// PRIVATE_BILLING_MASK__GROUP_TYPE=Power2
    /// ```
    pub group_type: GroupType,

    /// The number of decimal places kept when a value is masked, at most `9`.
    ///
    /// # Examples
    ///
    /// **TOML**
    /// ```text
    /// [mask]
    /// precision = 6
    /// ```
    ///
    /// **Environment variable**
    /// ```text
    /// PRIVATE_BILLING_MASK__PRECISION=6
    /// ```
    pub precision: u8,

    /// The absolute bound of the values to be masked.
    ///
    /// # Examples
    ///
    /// **TOML**
    /// ```text
    /// [mask]
    /// bound_type = "B6"
    /// ```
    ///
    /// **Environment variable**
    /// ```text
    /// PRIVATE_BILLING_MASK__BOUND_TYPE=B6
    /// ```
    pub bound_type: BoundType,

    /// The maximum number of clients whose masked values are aggregated.
    ///
    /// # Examples
    ///
    /// **TOML**
    /// ```text
    /// [mask]
    /// participant_type = "P3"
    /// ```
    ///
    /// **Environment variable**
    /// ```text
    /// PRIVATE_BILLING_MASK__PARTICIPANT_TYPE=P3
    /// ```
    pub participant_type: ParticipantType,
}

impl MaskSettings {
    /// Checks the mask settings.
    fn validate_mask(&self) -> Result<(), ValidationError> {
        if MaskConfig::from(*self).is_valid() {
            Ok(())
        } else {
            Err(ValidationError::new("invalid masking precision"))
        }
    }
}

/// A wrapper for validate derive.
fn validate_mask(s: &MaskSettings) -> Result<(), ValidationError> {
    s.validate_mask()
}

impl From<MaskSettings> for MaskConfig {
    fn from(
        MaskSettings {
            group_type,
            precision,
            bound_type,
            participant_type,
        }: MaskSettings,
    ) -> Self {
        MaskConfig {
            group_type,
            precision,
            bound_type,
            participant_type,
        }
    }
}

#[derive(Debug, Deserialize)]
/// Logging settings.
pub struct LoggingSettings {
    /// A comma-separated list of logging directives. More information about logging directives
    /// can be found [here].
    ///
    /// # Examples
    ///
    /// **TOML**
    /// ```text
    /// [log]
    /// filter = "info"
    /// ```
    ///
    /// **Environment variable**
    /// ```text
    /// PRIVATE_BILLING_LOG__FILTER=info
    /// ```
    ///
    /// [here]: https://docs.rs/tracing-subscriber/0.2.15/tracing_subscriber/filter/struct.EnvFilter.html#directives
    #[serde(deserialize_with = "deserialize_env_filter")]
    pub filter: EnvFilter,
}

fn deserialize_env_filter<'de, D>(deserializer: D) -> Result<EnvFilter, D::Error>
where
    D: Deserializer<'de>,
{
    struct EnvFilterVisitor;

    impl<'de> Visitor<'de> for EnvFilterVisitor {
        type Value = EnvFilter;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            write!(formatter, "a valid tracing filter directive: https://docs.rs/tracing-subscriber/0.2.15/tracing_subscriber/filter/struct.EnvFilter.html#directives")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            EnvFilter::try_new(value)
                .map_err(|_| de::Error::invalid_value(serde::de::Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_str(EnvFilterVisitor)
}
