//! Feedback command handler

use anyhow::Result;
use clap::Args;
use colored::*;
use serde_json::{Map, Value};
use studio_core::dto::feedback::FeedbackRequest;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct FeedbackArgs {
    /// What is being rated, e.g. "lyrics" or a job id
    #[arg(long)]
    target: String,

    /// Rating from 1 to 5
    #[arg(long)]
    rating: i64,

    /// Why the rating was given
    #[arg(long)]
    reason: Option<String>,

    /// Project the result belongs to
    #[arg(long)]
    project: Option<String>,

    /// Extra metadata as key=value pairs
    #[arg(short, long, value_parser = parse_key_val)]
    meta: Vec<(String, String)>,
}

impl FeedbackArgs {
    fn request(self) -> FeedbackRequest {
        let meta = (!self.meta.is_empty()).then(|| {
            Value::Object(
                self.meta
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect::<Map<_, _>>(),
            )
        });

        FeedbackRequest {
            project_id: self.project,
            target: Some(self.target),
            rating: Some(self.rating),
            reason: self.reason,
            meta,
        }
    }
}

/// Parse a single key=value pair
fn parse_key_val(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((key.to_string(), value.to_string()))
}

pub async fn submit(args: FeedbackArgs, config: &Config) -> Result<()> {
    let ack = config.client().submit_feedback(args.request()).await?;

    println!(
        "{} Feedback recorded for {} ({}/5)",
        "✓".green(),
        ack.stored.target.cyan(),
        ack.stored.rating
    );
    if let Some(reason) = &ack.stored.reason {
        println!("  {}", reason.dimmed());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("take=3").unwrap(),
            ("take".to_string(), "3".to_string())
        );
        assert_eq!(parse_key_val("note=a=b").unwrap().1, "a=b");
        assert!(parse_key_val("novalue").is_err());
    }

    #[test]
    fn test_meta_becomes_object() {
        let args = FeedbackArgs {
            target: "lyrics".into(),
            rating: 4,
            reason: None,
            project: None,
            meta: vec![("take".into(), "3".into())],
        };
        let req = args.request();
        assert_eq!(req.meta.unwrap()["take"], "3");
        assert_eq!(req.rating, Some(4));
    }
}
