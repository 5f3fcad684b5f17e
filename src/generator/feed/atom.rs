//! Atom 1.0 feed generation.

use anyhow::{Context, Result};
use atom_syndication::{
    CategoryBuilder, ContentBuilder, Entry, EntryBuilder, FeedBuilder, FixedDateTime,
    GeneratorBuilder, Link, LinkBuilder, Person, PersonBuilder, Text,
};

use super::common::{FeedPost, FeedScope, feed_updated};
use crate::config::SiteConfig;
use crate::utils::date::DateTimeUtc;

/// Used for `updated` when a feed has no entries.
const EPOCH: DateTimeUtc = DateTimeUtc::from_ymd(1970, 1, 1);

pub fn to_xml(config: &SiteConfig, scope: &FeedScope<'_>, posts: &[FeedPost]) -> Result<String> {
    let entries = posts
        .iter()
        .map(to_entry)
        .collect::<Result<Vec<Entry>>>()?;

    let author: Person = PersonBuilder::default()
        .name(config.site.author.clone())
        .email(config.site.email.clone())
        .build();

    let self_link: Link = LinkBuilder::default()
        .href(scope.file_url(config, &config.build.feed.atom))
        .rel("self".to_string())
        .mime_type(Some("application/atom+xml".to_string()))
        .build();

    let page_url = config.site.absolute(&scope.page_url);
    let alternate_link: Link = LinkBuilder::default()
        .href(page_url.clone())
        .rel("alternate".to_string())
        .build();

    let subtitle = (!config.site.description.is_empty())
        .then(|| Text::plain(config.site.description.clone()));

    let feed = FeedBuilder::default()
        .title(Text::plain(scope.title.clone()))
        .id(page_url)
        .updated(timestamp(feed_updated(posts).unwrap_or(EPOCH))?)
        .authors(vec![author])
        .links(vec![self_link, alternate_link])
        .subtitle(subtitle)
        .generator(Some(GeneratorBuilder::default().value("kiln").build()))
        .lang(Some(config.site.language.clone()))
        .entries(entries)
        .build();

    Ok(feed.to_string())
}

fn timestamp(date: DateTimeUtc) -> Result<FixedDateTime> {
    date.to_rfc3339()
        .parse()
        .with_context(|| format!("invalid feed timestamp {date}"))
}

fn to_entry(post: &FeedPost) -> Result<Entry> {
    let link: Link = LinkBuilder::default()
        .href(post.link.clone())
        .rel("alternate".to_string())
        .build();

    let authors: Vec<Person> = post
        .author
        .iter()
        .map(|name| PersonBuilder::default().name(name.clone()).build())
        .collect();

    let categories = post
        .categories
        .iter()
        .map(|name| CategoryBuilder::default().term(name.clone()).build())
        .collect::<Vec<_>>();

    let content = ContentBuilder::default()
        .value(Some(post.content.clone()))
        .content_type(Some("html".to_string()))
        .build();

    Ok(EntryBuilder::default()
        .title(Text::plain(post.title.clone()))
        .id(post.link.clone())
        .updated(timestamp(post.updated)?)
        .published(Some(timestamp(post.date)?))
        .links(vec![link])
        .summary(post.summary.clone().map(Text::plain))
        .content(Some(content))
        .authors(authors)
        .categories(categories)
        .build())
}
