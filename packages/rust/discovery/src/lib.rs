//! Page discovery for arbitrary public websites.
//!
//! Given only a site root, sitepages produces a representative, de-duplicated
//! page list by trying, in order:
//!
//! 1. sitemaps declared in `robots.txt` (filtered by the root's robots rules)
//! 2. the conventional `/sitemap.xml`
//! 3. the absolute links found on the homepage
//!
//! Every network call is awaited in sequence with a finite timeout and is
//! never retried. A failed fetch only means "no pages from this source".
//! Dropping the returned future abandons any in-flight request.

pub mod fetch;
pub mod homepage;
pub mod links;
pub mod robots;
pub mod site_url;
pub mod sitemap;

use std::time::Duration;

use tracing::{debug, info, instrument};

use sitepages_shared::{
    AppConfig, DiscoveryFailure, DiscoveryMethod, DiscoveryResult, Envelope, FetchConfig,
    PageList, Result,
};

pub use fetch::Fetcher;
pub use homepage::HomepageLinkExtractor;
pub use links::normalize_links;
pub use robots::RobotsPolicy;
pub use site_url::SiteUrl;
pub use sitemap::{SITEMAP_TIMEOUT, SitemapDocument, SitemapReader};

// ---------------------------------------------------------------------------
// Discovery options
// ---------------------------------------------------------------------------

/// Configuration for the discovery process.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// HTTP settings from the `[fetch]` config section.
    pub fetch: FetchConfig,
    /// Timeout for each sitemap request.
    pub sitemap_timeout: Duration,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            sitemap_timeout: SITEMAP_TIMEOUT,
        }
    }
}

impl From<&AppConfig> for DiscoveryOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            fetch: config.fetch.clone(),
            sitemap_timeout: SITEMAP_TIMEOUT,
        }
    }
}

impl DiscoveryOptions {
    fn robots_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.robots_timeout_secs)
    }

    fn homepage_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.homepage_timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Strategies and progress
// ---------------------------------------------------------------------------

/// One discovery strategy, in the order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    RobotsSitemaps,
    ConventionalSitemap,
    ManualCrawl,
}

impl Strategy {
    /// Attempt order; the first strategy that finds pages wins.
    pub const ORDER: [Strategy; 3] = [
        Strategy::RobotsSitemaps,
        Strategy::ConventionalSitemap,
        Strategy::ManualCrawl,
    ];

    /// Short human-readable description.
    pub fn label(self) -> &'static str {
        match self {
            Self::RobotsSitemaps => "Reading sitemaps declared in robots.txt",
            Self::ConventionalSitemap => "Reading /sitemap.xml",
            Self::ManualCrawl => "Collecting homepage links",
        }
    }
}

/// Progress callback for reporting discovery status.
pub trait ProgressReporter: Send + Sync {
    /// Called before a strategy is attempted.
    fn strategy(&self, strategy: Strategy);
    /// Called once with the final result.
    fn done(&self, result: &DiscoveryResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn strategy(&self, _strategy: Strategy) {}
    fn done(&self, _result: &DiscoveryResult) {}
}

/// What a single strategy attempt produced.
#[derive(Debug)]
enum Attempt {
    Found(PageList),
    /// The source answered (or was absent) but gave no usable pages.
    Empty,
    /// The homepage itself could not be fetched.
    Unreachable,
}

impl Attempt {
    /// `Found` for a non-empty list, `Empty` otherwise.
    fn from_pages(pages: PageList) -> Self {
        if pages.is_empty() {
            Attempt::Empty
        } else {
            Attempt::Found(pages)
        }
    }
}

/// Failure reason once every strategy has come back without pages.
fn exhausted(last: &Attempt) -> DiscoveryFailure {
    match last {
        Attempt::Unreachable => DiscoveryFailure::NoSitemapFound,
        _ => DiscoveryFailure::NoLinksFound,
    }
}

// ---------------------------------------------------------------------------
// Discoverer
// ---------------------------------------------------------------------------

/// Runs the three-tier discovery strategy for one site at a time.
///
/// Holds no per-request state; one instance can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct Discoverer {
    opts: DiscoveryOptions,
    fetcher: Fetcher,
    sitemaps: SitemapReader,
    homepage: HomepageLinkExtractor,
}

impl Discoverer {
    /// Create a discoverer with the given options.
    pub fn new(opts: DiscoveryOptions) -> Result<Self> {
        let fetcher = Fetcher::new(&opts.fetch)?;
        let sitemaps = SitemapReader::new(
            fetcher.clone(),
            opts.sitemap_timeout,
            opts.fetch.max_child_sitemaps,
        );
        let homepage = HomepageLinkExtractor::new(fetcher.clone(), opts.homepage_timeout());

        Ok(Self {
            opts,
            fetcher,
            sitemaps,
            homepage,
        })
    }

    /// The homepage extractor, for callers that need raw page HTML.
    pub fn homepage(&self) -> &HomepageLinkExtractor {
        &self.homepage
    }

    /// Answer a `website` request parameter with the response envelope.
    ///
    /// A missing or empty parameter yields `"Missing url parameter"`.
    pub async fn handle_request(
        &self,
        website: Option<&str>,
        progress: &dyn ProgressReporter,
    ) -> Envelope {
        let result = match website {
            Some(website) if !website.is_empty() => self.discover(website, progress).await,
            _ => DiscoveryFailure::MissingUrl.into(),
        };
        result.into_envelope()
    }

    /// Discover pages for a raw website string such as `example.com`.
    #[instrument(skip(self, progress))]
    pub async fn discover(&self, website: &str, progress: &dyn ProgressReporter) -> DiscoveryResult {
        let result = match SiteUrl::parse(website) {
            Ok(root) => self.discover_site(&root, progress).await,
            Err(e) => {
                debug!(error = %e, "rejected website");
                DiscoveryFailure::InvalidUrl.into()
            }
        };

        match &result {
            DiscoveryResult::Success(pages) => info!(
                method = %pages.method,
                source = %pages.url,
                pages = pages.count(),
                "discovery succeeded"
            ),
            DiscoveryResult::Failure(reason) => info!(%reason, "discovery failed"),
        }

        progress.done(&result);
        result
    }

    /// Run the strategies against an already-normalized root.
    #[instrument(skip_all, fields(host = root.url().host_str().unwrap_or_default()))]
    pub async fn discover_site(
        &self,
        root: &SiteUrl,
        progress: &dyn ProgressReporter,
    ) -> DiscoveryResult {
        let mut last = Attempt::Empty;

        for strategy in Strategy::ORDER {
            progress.strategy(strategy);
            match self.attempt(strategy, root).await {
                Attempt::Found(pages) => return DiscoveryResult::Success(pages),
                other => {
                    debug!(?strategy, outcome = ?other, "strategy found nothing");
                    last = other;
                }
            }
        }

        exhausted(&last).into()
    }

    async fn attempt(&self, strategy: Strategy, root: &SiteUrl) -> Attempt {
        match strategy {
            Strategy::RobotsSitemaps => self.try_robots_sitemaps(root).await,
            Strategy::ConventionalSitemap => self.try_conventional_sitemap(root).await,
            Strategy::ManualCrawl => self.try_manual_crawl(root).await,
        }
    }

    /// Each declared sitemap in order; the first with allowed pages wins.
    ///
    /// Pages are filtered with the root's robots.txt, fetched again for every
    /// non-empty sitemap, even when the sitemap lives on another host.
    #[instrument(skip_all, fields(root = %root))]
    async fn try_robots_sitemaps(&self, root: &SiteUrl) -> Attempt {
        let policy = self.fetch_policy(root).await;

        for sitemap_url in policy.declared_sitemaps() {
            let pages = self.sitemaps.read(sitemap_url).await;
            if pages.is_empty() {
                continue;
            }

            let root_policy = self.fetch_policy(root).await;
            let total = pages.len();
            let allowed: Vec<String> = pages
                .into_iter()
                .filter(|page| root_policy.is_allowed(page))
                .collect();
            debug!(%sitemap_url, total, allowed = allowed.len(), "applied robots rules");

            let list = PageList::new(sitemap_url.as_str(), DiscoveryMethod::Robots, allowed);
            if !list.is_empty() {
                return Attempt::Found(list);
            }
        }

        Attempt::Empty
    }

    #[instrument(skip_all, fields(root = %root))]
    async fn try_conventional_sitemap(&self, root: &SiteUrl) -> Attempt {
        let sitemap_url = root.sitemap_xml_url();
        let pages = self.sitemaps.read(&sitemap_url).await;
        Attempt::from_pages(PageList::new(sitemap_url, DiscoveryMethod::Sitemap, pages))
    }

    #[instrument(skip_all, fields(root = %root))]
    async fn try_manual_crawl(&self, root: &SiteUrl) -> Attempt {
        match self.homepage.extract(root).await {
            None => Attempt::Unreachable,
            Some(links) => {
                Attempt::from_pages(PageList::new(root.as_str(), DiscoveryMethod::Manual, links))
            }
        }
    }

    async fn fetch_policy(&self, root: &SiteUrl) -> RobotsPolicy {
        robots::fetch_policy(
            &self.fetcher,
            root,
            &self.opts.fetch.user_agent,
            self.opts.robots_timeout(),
        )
        .await
    }
}
