//! ID resolver module
//!
//! Resolves job id prefixes to full UUIDs by listing the ledger, so users can
//! type `studio job status 3f2a` instead of the whole id.

use anyhow::{Context, Result, anyhow};
use studio_client::StudioClient;
use uuid::Uuid;

use crate::types::IdOrPrefix;

/// Resolve a job ID or prefix to a full UUID
///
/// A full UUID is returned as-is without touching the server.
///
/// # Errors
/// Returns an error if no job matches, the prefix is ambiguous, or the
/// listing call fails.
pub async fn resolve_job_id(client: &StudioClient, id_or_prefix: &IdOrPrefix) -> Result<Uuid> {
    if let Some(uuid) = id_or_prefix.as_uuid() {
        return Ok(uuid);
    }

    let jobs = client
        .list_jobs()
        .await
        .context("Failed to fetch jobs for ID resolution")?;

    match_prefix(jobs.iter().map(|j| j.id), &id_or_prefix.to_string())
}

fn match_prefix(ids: impl Iterator<Item = Uuid>, prefix: &str) -> Result<Uuid> {
    if prefix.is_empty() {
        return Err(anyhow!("Job ID must not be empty"));
    }

    let matches: Vec<Uuid> = ids
        .filter(|id| id.to_string().starts_with(prefix))
        .collect();

    match matches.as_slice() {
        [] => Err(anyhow!("No job found with ID starting with '{}'", prefix)),
        [id] => Ok(*id),
        _ => {
            let ids: Vec<String> = matches.iter().map(Uuid::to_string).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple jobs: {}",
                prefix,
                ids.join(", ")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Uuid {
        Uuid::parse_str(s).unwrap()
    }

    #[test]
    fn test_unique_prefix_resolves() {
        let ids = [
            id("3f2a0000-0000-4000-8000-000000000001"),
            id("9b010000-0000-4000-8000-000000000002"),
        ];
        let resolved = match_prefix(ids.into_iter(), "3f").unwrap();
        assert_eq!(resolved, ids[0]);
    }

    #[test]
    fn test_ambiguous_prefix_lists_candidates() {
        let ids = [
            id("3f2a0000-0000-4000-8000-000000000001"),
            id("3f2b0000-0000-4000-8000-000000000002"),
        ];
        let err = match_prefix(ids.into_iter(), "3f2").unwrap_err().to_string();
        assert!(err.contains("Ambiguous"));
        assert!(err.contains("3f2b0000"));
    }

    #[test]
    fn test_missing_prefix() {
        let err = match_prefix(std::iter::empty(), "ff").unwrap_err();
        assert!(err.to_string().contains("No job found"));
    }

    #[test]
    fn test_empty_prefix_is_rejected() {
        let ids = [id("3f2a0000-0000-4000-8000-000000000001")];
        assert!(match_prefix(ids.into_iter(), "").is_err());
    }
}
