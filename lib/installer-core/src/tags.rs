//! Resource tags for AWS objects created by CAPA

use crate::{InstallerError, Result};
use std::collections::BTreeMap;

const MAX_KEY_LENGTH: usize = 128;
const MAX_VALUE_LENGTH: usize = 256;
const RESERVED_KEY_PREFIX: &str = "aws:";

/// Tag marking a resource as owned by the cluster
pub fn cluster_ownership_tag(infra_id: &str) -> (String, String) {
    (format!("kubernetes.io/cluster/{}", infra_id), "owned".to_string())
}

/// Merge the user tags with the tags the installer always sets.
///
/// User tags may not override system tags and must respect AWS tag limits.
pub fn capa_tags_from_user_tags(
    infra_id: &str,
    user_tags: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>> {
    let mut tags = BTreeMap::new();
    let (key, value) = cluster_ownership_tag(infra_id);
    tags.insert(key, value);

    let forbidden: Vec<&str> = user_tags
        .keys()
        .filter(|k| tags.contains_key(*k))
        .map(String::as_str)
        .collect();
    if !forbidden.is_empty() {
        return Err(InstallerError::InvalidTags(format!(
            "user tag keys {:?} are not allowed",
            forbidden
        )));
    }

    for (key, value) in user_tags {
        validate_tag(key, value)?;
        tags.insert(key.clone(), value.clone());
    }

    Ok(tags)
}

fn validate_tag(key: &str, value: &str) -> Result<()> {
    if key.is_empty() {
        return Err(InstallerError::InvalidTags("tag key must not be empty".to_string()));
    }
    if key.chars().count() > MAX_KEY_LENGTH {
        return Err(InstallerError::InvalidTags(format!(
            "tag key {} is longer than {} characters",
            key, MAX_KEY_LENGTH
        )));
    }
    if value.chars().count() > MAX_VALUE_LENGTH {
        return Err(InstallerError::InvalidTags(format!(
            "value of tag {} is longer than {} characters",
            key, MAX_VALUE_LENGTH
        )));
    }
    if key.to_ascii_lowercase().starts_with(RESERVED_KEY_PREFIX) {
        return Err(InstallerError::InvalidTags(format!(
            "tag key {} uses the reserved prefix {}",
            key, RESERVED_KEY_PREFIX
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_system_tag_always_present() {
        let tags = capa_tags_from_user_tags("infra-abc", &BTreeMap::new()).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(
            tags.get("kubernetes.io/cluster/infra-abc").map(String::as_str),
            Some("owned")
        );
    }

    #[test]
    fn test_user_tags_merged() {
        let tags =
            capa_tags_from_user_tags("infra-abc", &user_tags(&[("team", "infra"), ("env", "dev")]))
                .unwrap();
        assert_eq!(tags.len(), 3);
        assert_eq!(tags.get("team").map(String::as_str), Some("infra"));
        // BTreeMap keeps the merge order stable
        let keys: Vec<&String> = tags.keys().collect();
        assert_eq!(keys, vec!["env", "kubernetes.io/cluster/infra-abc", "team"]);
    }

    #[test]
    fn test_user_tag_cannot_override_ownership() {
        let err = capa_tags_from_user_tags(
            "infra-abc",
            &user_tags(&[("kubernetes.io/cluster/infra-abc", "shared")]),
        )
        .unwrap_err();
        assert!(matches!(err, InstallerError::InvalidTags(_)));
    }

    #[test]
    fn test_malformed_user_tags() {
        let long_key = "k".repeat(129);
        let long_value = "v".repeat(257);

        assert!(capa_tags_from_user_tags("id", &user_tags(&[("", "x")])).is_err());
        assert!(capa_tags_from_user_tags("id", &user_tags(&[(long_key.as_str(), "x")])).is_err());
        assert!(capa_tags_from_user_tags("id", &user_tags(&[("k", long_value.as_str())])).is_err());
        assert!(capa_tags_from_user_tags("id", &user_tags(&[("aws:owner", "x")])).is_err());
    }
}
