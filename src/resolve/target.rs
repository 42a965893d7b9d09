use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One resolved community/channel to harvest
///
/// Created by [`resolve`](crate::resolve::resolve) from one input row and
/// immutable afterwards. Identity is the `(platform, platform_id)` pair; the
/// original link and display name are carried along for the report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// The link string exactly as it appeared in the input file
    pub original_link: String,

    /// Which platform the link resolved to
    pub platform: Platform,

    /// Canonical identifier, tagged with the platform prefix (e.g. `vk_mygroup`)
    pub platform_id: String,

    /// Human-readable name from the input file
    pub display_name: String,
}

impl Target {
    /// Returns the platform identifier with the platform prefix stripped
    ///
    /// Platform clients address communities by their raw identifier; the
    /// prefix only exists to keep identities unambiguous across platforms.
    pub fn bare_id(&self) -> &str {
        self.platform_id
            .strip_prefix(self.platform.id_prefix())
            .unwrap_or(&self.platform_id)
    }
}

/// Ordered sequence of targets with a derived content-identity hash
#[derive(Debug, Clone, Default)]
pub struct TargetSet {
    targets: Vec<Target>,
}

impl TargetSet {
    /// Creates a target set preserving the given order
    pub fn new(targets: Vec<Target>) -> Self {
        Self { targets }
    }

    /// Returns the targets in input order
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Returns an iterator over the targets in input order
    pub fn iter(&self) -> std::slice::Iter<'_, Target> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Computes the content-identity hash of this set
    ///
    /// The hash is a hex-encoded SHA-256 digest of the targets sorted by
    /// `(platform, platform_id)` and serialized to JSON, so two sets with the
    /// same members hash identically regardless of input order. Used to decide
    /// whether an existing report can be extended or must be superseded.
    pub fn content_hash(&self) -> String {
        let mut sorted: Vec<&Target> = self.targets.iter().collect();
        sorted.sort_by(|a, b| {
            a.platform
                .id_prefix()
                .cmp(b.platform.id_prefix())
                .then_with(|| a.platform_id.cmp(&b.platform_id))
        });

        let mut hasher = Sha256::new();
        for target in sorted {
            // Struct field order is fixed, so the JSON form is stable.
            let serialized = serde_json::to_string(target).unwrap_or_default();
            hasher.update(serialized.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}

impl IntoIterator for TargetSet {
    type Item = Target;
    type IntoIter = std::vec::IntoIter<Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.into_iter()
    }
}
