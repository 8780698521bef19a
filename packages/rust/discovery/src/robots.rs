//! robots.txt retrieval and allow/disallow evaluation.
//!
//! Rule matching is delegated to `texting_robots`, which groups rules by
//! `User-agent`, lets the longest matching path win, and treats paths with no
//! matching rule as allowed.

use std::time::Duration;

use texting_robots::Robot;
use tracing::{debug, info, instrument};
use url::Url;

use crate::fetch::Fetcher;
use crate::site_url::SiteUrl;

/// A site's crawl policy, built fresh for every discovery request.
pub struct RobotsPolicy {
    sitemaps: Vec<String>,
    robot: Option<Robot>,
}

impl RobotsPolicy {
    /// The policy of a site without a usable robots.txt: no sitemaps, everything allowed.
    pub fn empty() -> Self {
        Self {
            sitemaps: Vec::new(),
            robot: None,
        }
    }

    /// Parse robots.txt content, evaluating rules for `agent`.
    pub fn parse(agent: &str, content: &str) -> Self {
        match Robot::new(agent, content.as_bytes()) {
            Ok(robot) => Self {
                sitemaps: robot.sitemaps.clone(),
                robot: Some(robot),
            },
            Err(e) => {
                debug!(error = %e, "unparsable robots.txt, allowing everything");
                Self::empty()
            }
        }
    }

    /// Sitemap URLs declared with `Sitemap:`, in file order.
    pub fn declared_sitemaps(&self) -> &[String] {
        &self.sitemaps
    }

    /// Whether the policy lets the agent fetch `target`.
    ///
    /// `target` may be a path or an absolute URL; only the path and query of
    /// an absolute URL are matched against the rules, whatever its host.
    pub fn is_allowed(&self, target: &str) -> bool {
        let Some(robot) = &self.robot else {
            return true;
        };

        match Url::parse(target) {
            Ok(url) => {
                let path = match url.query() {
                    Some(query) => format!("{}?{query}", url.path()),
                    None => url.path().to_string(),
                };
                robot.allowed(&path)
            }
            Err(_) => robot.allowed(target),
        }
    }
}

impl std::fmt::Debug for RobotsPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RobotsPolicy")
            .field("sitemaps", &self.sitemaps)
            .field("has_rules", &self.robot.is_some())
            .finish()
    }
}

/// Fetch and parse `{root}/robots.txt`.
///
/// A missing file, non-200 answer, timeout, or network failure all yield
/// [`RobotsPolicy::empty`]; robots.txt is optional for public sites.
#[instrument(skip(fetcher), fields(root = %root))]
pub async fn fetch_policy(
    fetcher: &Fetcher,
    root: &SiteUrl,
    agent: &str,
    timeout: Duration,
) -> RobotsPolicy {
    let robots_url = root.robots_txt_url();

    match fetcher.get_text(&robots_url, timeout).await {
        Ok(content) => {
            let policy = RobotsPolicy::parse(agent, &content);
            info!(
                sitemaps = policy.declared_sitemaps().len(),
                "robots.txt parsed"
            );
            policy
        }
        Err(e) => {
            debug!(error = %e, "robots.txt unavailable");
            RobotsPolicy::empty()
        }
    }
}
