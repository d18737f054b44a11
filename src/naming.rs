//! Bucket naming.
//!
//! S3 bucket names live in a global namespace, so every website bucket gets a
//! numeric suffix. The suffix space is `0..=999_999`: it spreads names out but
//! does not guarantee uniqueness. Two deployments of the same project can still
//! collide, in which case the deployment engine reports the bucket as taken.

use adler32::RollingAdler32;

pub const SUFFIX_SPACE: u32 = 1_000_000;

/// Where the bucket-name suffix comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuffixSource {
    /// exactly this value, reduced into the suffix space.
    Fixed(u32),
    /// adler32 of the seed, reduced into the suffix space. the same seed
    /// always produces the same bucket name.
    Seeded(String),
    /// a fresh random value on every call.
    Random,
}

impl SuffixSource {
    pub fn seeded<S: AsRef<str>>(seed: S) -> Self {
        SuffixSource::Seeded(seed.as_ref().to_string())
    }

    pub fn suffix(&self) -> u32 {
        match self {
            SuffixSource::Fixed(n) => n % SUFFIX_SPACE,
            SuffixSource::Seeded(seed) => {
                RollingAdler32::from_buffer(seed.as_bytes()).hash() % SUFFIX_SPACE
            }
            SuffixSource::Random => rand::random_range(0..SUFFIX_SPACE),
        }
    }
}

/// `{project_name}-website-bucket-{suffix}`, lowercased.
pub fn website_bucket_name(project_name: &str, suffix: u32) -> String {
    format!("{project_name}-website-bucket-{suffix}").to_lowercase()
}

/// logical ids in a template may only contain `[A-Za-z0-9]`.
pub fn logical_id_prefix(construct_id: &str) -> String {
    construct_id.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}
