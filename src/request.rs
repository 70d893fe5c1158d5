//! Content identifiers as the host plugin sends them, parsed into typed
//! requests up front so the rest of the crate never matches on raw strings.
//!
//! The grammar is colon-separated: `shows[:order[:filter]]`,
//! `show:{id}[:{season}[:{order}]]` (the season segment may be left empty),
//! `bean:{id}[:{order}]`, `beans[:order]`, `search[:{expression}]` and the
//! bare `overview` and `new`. Extension actions use the same vocabulary
//! without parameters. Entity ids stay uninterpreted strings; an empty one
//! is reported by the backend, not the parser.

use crate::api::routes::{EpisodesOrder, ShowsFilter, ShowsOrder};
use crate::session::sort::BeansOrder;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Unknown content id: {0}")]
    UnknownContentId(String),
    #[error("Unknown extension action: {0}")]
    UnknownExtendAction(String),
}

/// A parsed content identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRequest {
    Overview,
    Shows {
        order: Option<ShowsOrder>,
        filter: Option<ShowsFilter>,
    },
    Show {
        id: String,
        season: Option<String>,
        order: EpisodesOrder,
    },
    NewEpisodes,
    Beans {
        order: BeansOrder,
    },
    Bean {
        id: String,
        order: EpisodesOrder,
    },
    Search {
        expression: String,
    },
}

/// A parsed extension action, naming the session kind it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendRequest {
    Shows,
    ShowEpisodes,
    SeasonEpisodes,
    NewEpisodes,
    BeanEpisodes,
}

fn split_head(id: &str) -> (&str, Option<&str>) {
    match id.split_once(':') {
        Some((head, rest)) => (head, Some(rest)),
        None => (id, None),
    }
}

impl FromStr for ContentRequest {
    type Err = RequestError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let (head, rest) = split_head(id);
        let mut parts = rest.into_iter().flat_map(|r| r.split(':'));
        match head {
            "overview" if rest.is_none() => Ok(ContentRequest::Overview),
            "shows" => {
                // A missing segment means the host's default token; an empty
                // one is an unknown token and omits the parameter.
                let order = parts.next().unwrap_or("default");
                let filter = parts.next().unwrap_or("default");
                Ok(ContentRequest::Shows {
                    order: ShowsOrder::from_token(order),
                    filter: ShowsFilter::from_token(filter),
                })
            }
            "show" => {
                let id = parts.next().unwrap_or("").to_owned();
                let season = parts.next().filter(|s| !s.is_empty()).map(str::to_owned);
                let order = EpisodesOrder::from_token(parts.next().unwrap_or(""));
                Ok(ContentRequest::Show { id, season, order })
            }
            "new" if rest.is_none() => Ok(ContentRequest::NewEpisodes),
            "beans" => Ok(ContentRequest::Beans {
                order: BeansOrder::from_token(parts.next().unwrap_or("default")),
            }),
            "bean" => {
                let id = parts.next().unwrap_or("").to_owned();
                let order = EpisodesOrder::from_token(parts.next().unwrap_or(""));
                Ok(ContentRequest::Bean { id, order })
            }
            // The expression is the raw remainder; it may contain colons.
            "search" => Ok(ContentRequest::Search {
                expression: rest.unwrap_or("").to_owned(),
            }),
            _ => Err(RequestError::UnknownContentId(id.to_owned())),
        }
    }
}

impl FromStr for ExtendRequest {
    type Err = RequestError;

    fn from_str(action: &str) -> Result<Self, Self::Err> {
        let (head, rest) = split_head(action);
        match (head, rest) {
            ("shows", None) => Ok(ExtendRequest::Shows),
            ("show", None | Some("")) => Ok(ExtendRequest::ShowEpisodes),
            ("show", Some(_)) => Ok(ExtendRequest::SeasonEpisodes),
            ("new", None) => Ok(ExtendRequest::NewEpisodes),
            ("bean", None) => Ok(ExtendRequest::BeanEpisodes),
            _ => Err(RequestError::UnknownExtendAction(action.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(id: &str) -> ContentRequest {
        id.parse().unwrap()
    }

    #[test]
    fn test_overview_and_new_are_bare_ids() {
        assert_eq!(parse("overview"), ContentRequest::Overview);
        assert_eq!(parse("new"), ContentRequest::NewEpisodes);
        assert!("overview:x".parse::<ContentRequest>().is_err());
        assert!("new:x".parse::<ContentRequest>().is_err());
    }

    #[test]
    fn test_shows_defaults_and_tokens() {
        assert_eq!(
            parse("shows"),
            ContentRequest::Shows {
                order: Some(ShowsOrder::LastEpisode),
                filter: None,
            }
        );
        assert_eq!(parse("shows"), parse("shows:default:default"));
        assert_eq!(
            parse("shows:title"),
            ContentRequest::Shows {
                order: Some(ShowsOrder::Title),
                filter: None,
            }
        );
        assert_eq!(
            parse("shows:default:podcast"),
            ContentRequest::Shows {
                order: Some(ShowsOrder::LastEpisode),
                filter: Some(ShowsFilter::Podcast),
            }
        );
    }

    #[test]
    fn test_shows_unknown_tokens_omit_the_parameter() {
        assert_eq!(
            parse("shows:whatever"),
            ContentRequest::Shows {
                order: None,
                filter: None,
            }
        );
        assert_eq!(
            parse("shows::podcast"),
            ContentRequest::Shows {
                order: None,
                filter: Some(ShowsFilter::Podcast),
            }
        );
    }

    #[test]
    fn test_show_with_optional_season_and_order() {
        assert_eq!(
            parse("show:95"),
            ContentRequest::Show {
                id: "95".to_owned(),
                season: None,
                order: EpisodesOrder::Newest,
            }
        );
        assert_eq!(
            parse("show:95:1162"),
            ContentRequest::Show {
                id: "95".to_owned(),
                season: Some("1162".to_owned()),
                order: EpisodesOrder::Newest,
            }
        );
        assert_eq!(
            parse("show:95:1162:reverse"),
            ContentRequest::Show {
                id: "95".to_owned(),
                season: Some("1162".to_owned()),
                order: EpisodesOrder::Oldest,
            }
        );
    }

    #[test]
    fn test_show_accepts_empty_season_segment() {
        assert_eq!(
            parse("show:95::reverse"),
            ContentRequest::Show {
                id: "95".to_owned(),
                season: None,
                order: EpisodesOrder::Oldest,
            }
        );
    }

    #[test]
    fn test_show_without_id_keeps_it_for_the_backend() {
        assert_eq!(
            parse("show"),
            ContentRequest::Show {
                id: String::new(),
                season: None,
                order: EpisodesOrder::Newest,
            }
        );
    }

    #[test]
    fn test_beans_order_tokens() {
        assert_eq!(
            parse("beans"),
            ContentRequest::Beans {
                order: BeansOrder::Default,
            }
        );
        assert_eq!(
            parse("beans:name"),
            ContentRequest::Beans {
                order: BeansOrder::Name,
            }
        );
        assert_eq!(
            parse("beans:episodes"),
            ContentRequest::Beans {
                order: BeansOrder::Episodes,
            }
        );
        assert_eq!(parse("beans:junk"), parse("beans"));
    }

    #[test]
    fn test_bean_with_optional_order() {
        assert_eq!(
            parse("bean:17"),
            ContentRequest::Bean {
                id: "17".to_owned(),
                order: EpisodesOrder::Newest,
            }
        );
        assert_eq!(
            parse("bean:17:reverse"),
            ContentRequest::Bean {
                id: "17".to_owned(),
                order: EpisodesOrder::Oldest,
            }
        );
    }

    #[test]
    fn test_search_keeps_raw_expression() {
        assert_eq!(
            parse("search"),
            ContentRequest::Search {
                expression: String::new(),
            }
        );
        assert_eq!(
            parse("search:kino"),
            ContentRequest::Search {
                expression: "kino".to_owned(),
            }
        );
        assert_eq!(
            parse("search:kino: plus"),
            ContentRequest::Search {
                expression: "kino: plus".to_owned(),
            }
        );
    }

    #[test]
    fn test_unknown_content_id() {
        let err = "garbage".parse::<ContentRequest>().unwrap_err();
        assert_eq!(err, RequestError::UnknownContentId("garbage".to_owned()));
        assert_eq!(err.to_string(), "Unknown content id: garbage");
    }

    #[test]
    fn test_extend_actions() {
        assert_eq!("shows".parse(), Ok(ExtendRequest::Shows));
        assert_eq!("show".parse(), Ok(ExtendRequest::ShowEpisodes));
        assert_eq!("show:".parse(), Ok(ExtendRequest::ShowEpisodes));
        assert_eq!("show:1162".parse(), Ok(ExtendRequest::SeasonEpisodes));
        assert_eq!("new".parse(), Ok(ExtendRequest::NewEpisodes));
        assert_eq!("bean".parse(), Ok(ExtendRequest::BeanEpisodes));
    }

    #[test]
    fn test_unknown_extend_action() {
        let err = "beans".parse::<ExtendRequest>().unwrap_err();
        assert_eq!(
            err,
            RequestError::UnknownExtendAction("beans".to_owned())
        );
        assert!("shows:junk".parse::<ExtendRequest>().is_err());
    }
}
