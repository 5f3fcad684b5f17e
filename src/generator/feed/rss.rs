//! RSS 2.0 feed generation.

use anyhow::{Result, anyhow};
use rss::{CategoryBuilder, ChannelBuilder, GuidBuilder, Item, ItemBuilder, validation::Validate};

use super::common::{FeedPost, FeedScope, feed_updated};
use crate::config::SiteConfig;

pub fn to_xml(config: &SiteConfig, scope: &FeedScope<'_>, posts: &[FeedPost]) -> Result<String> {
    let items: Vec<Item> = posts.iter().map(|post| to_item(post, config)).collect();

    let channel = ChannelBuilder::default()
        .title(scope.title.clone())
        .link(config.site.absolute(&scope.page_url))
        .description(description(config))
        .language(Some(config.site.language.clone()))
        .generator(Some("kiln".to_string()))
        .last_build_date(feed_updated(posts).map(|d| d.to_rfc2822()))
        .items(items)
        .build();

    channel
        .validate()
        .map_err(|e| anyhow!("RSS validation failed for {}: {e}", scope.page_url))?;
    Ok(channel.to_string())
}

fn description(config: &SiteConfig) -> String {
    if config.site.description.is_empty() {
        config.site.title.clone()
    } else {
        config.site.description.clone()
    }
}

fn to_item(post: &FeedPost, config: &SiteConfig) -> Item {
    let categories = post
        .categories
        .iter()
        .map(|name| CategoryBuilder::default().name(name.clone()).build())
        .collect::<Vec<_>>();

    ItemBuilder::default()
        .title(Some(post.title.clone()))
        .link(Some(post.link.clone()))
        .guid(Some(
            GuidBuilder::default()
                .permalink(true)
                .value(post.link.clone())
                .build(),
        ))
        .description(Some(post.summary.clone().unwrap_or_else(|| post.content.clone())))
        .pub_date(Some(post.date.to_rfc2822()))
        .author(author(post, config))
        .categories(categories)
        .build()
}

/// RSS wants `email (Name)`; without a site email the field is left out.
fn author(post: &FeedPost, config: &SiteConfig) -> Option<String> {
    let email = config.site.email.as_deref()?;
    let name = post.author.as_deref().unwrap_or(&config.site.author);
    if name.is_empty() {
        Some(email.to_string())
    } else {
        Some(format!("{email} ({name})"))
    }
}
