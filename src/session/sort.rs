use crate::api::types::Bean;
use std::cmp::Ordering;
use std::time::{Duration, Instant};

/// Client-side order of the crew directory. The endpoint has no server-side
/// sorting, so reordering happens on the fetched snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BeansOrder {
    /// As delivered by the server.
    #[default]
    Default,
    /// Case-insensitive by display name, unnamed entries last.
    Name,
    /// Most episodes first, entries without a count last.
    Episodes,
}

impl BeansOrder {
    pub fn from_token(token: &str) -> Self {
        match token {
            "name" => BeansOrder::Name,
            "episodes" => BeansOrder::Episodes,
            _ => BeansOrder::Default,
        }
    }
}

#[derive(Debug)]
struct BeanEntry {
    bean: Bean,
    folded_name: Option<String>,
    episode_count: i64,
}

/// The fetched crew directory with its sort keys computed once.
#[derive(Debug)]
pub struct BeanDirectory {
    entries: Vec<BeanEntry>,
    created_at: Instant,
}

impl BeanDirectory {
    pub fn new(beans: Vec<Bean>) -> Self {
        let entries = beans
            .into_iter()
            .map(|bean| BeanEntry {
                folded_name: bean.display_name().map(str::to_lowercase),
                episode_count: bean.episode_count.unwrap_or(-1),
                bean,
            })
            .collect();
        Self {
            entries,
            created_at: Instant::now(),
        }
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() < ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The directory in the requested order. Ties keep server order.
    pub fn ordered(&self, order: BeansOrder) -> Vec<Bean> {
        let mut entries: Vec<&BeanEntry> = self.entries.iter().collect();
        match order {
            BeansOrder::Default => {}
            BeansOrder::Name => entries.sort_by(|a, b| {
                compare_names(a.folded_name.as_deref(), b.folded_name.as_deref())
            }),
            BeansOrder::Episodes => {
                entries.sort_by(|a, b| b.episode_count.cmp(&a.episode_count))
            }
        }
        entries.into_iter().map(|entry| entry.bean.clone()).collect()
    }
}

fn compare_names(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bean(name: Option<&str>, episodes: Option<i64>) -> Bean {
        Bean {
            name: name.map(String::from),
            episode_count: episodes,
            ..Bean::default()
        }
    }

    fn names(beans: &[Bean]) -> Vec<Option<&str>> {
        beans.iter().map(|b| b.name.as_deref()).collect()
    }

    #[test]
    fn test_order_token_mapping() {
        assert_eq!(BeansOrder::from_token("default"), BeansOrder::Default);
        assert_eq!(BeansOrder::from_token("name"), BeansOrder::Name);
        assert_eq!(BeansOrder::from_token("episodes"), BeansOrder::Episodes);
        assert_eq!(BeansOrder::from_token("whatever"), BeansOrder::Default);
    }

    #[test]
    fn test_default_order_keeps_server_order() {
        let directory = BeanDirectory::new(vec![
            bean(Some("Budi"), Some(3)),
            bean(Some("Anna"), Some(9)),
        ]);
        let ordered = directory.ordered(BeansOrder::Default);
        assert_eq!(names(&ordered), vec![Some("Budi"), Some("Anna")]);
    }

    #[test]
    fn test_name_order_is_case_insensitive_with_unnamed_last() {
        let directory = BeanDirectory::new(vec![
            bean(Some("budi"), None),
            bean(Some("Anna"), None),
            bean(None, None),
            bean(Some("Eddy"), None),
        ]);
        let ordered = directory.ordered(BeansOrder::Name);
        assert_eq!(
            names(&ordered),
            vec![Some("Anna"), Some("budi"), Some("Eddy"), None]
        );
    }

    #[test]
    fn test_name_order_prefers_computed_name() {
        let mut impostor = bean(Some("Zed"), None);
        impostor.computed_name = Some("Anna".to_owned());
        let directory = BeanDirectory::new(vec![bean(Some("Budi"), None), impostor]);

        let ordered = directory.ordered(BeansOrder::Name);
        assert_eq!(ordered[0].name.as_deref(), Some("Zed"));
    }

    #[test]
    fn test_episode_order_puts_uncounted_entries_last() {
        let directory = BeanDirectory::new(vec![
            bean(Some("five"), Some(5)),
            bean(Some("unknown"), None),
            bean(Some("nine"), Some(9)),
        ]);
        let ordered = directory.ordered(BeansOrder::Episodes);
        assert_eq!(
            names(&ordered),
            vec![Some("nine"), Some("five"), Some("unknown")]
        );
    }

    #[test]
    fn test_episode_order_is_stable_for_ties() {
        let directory = BeanDirectory::new(vec![
            bean(Some("first"), Some(4)),
            bean(Some("second"), Some(4)),
        ]);
        let ordered = directory.ordered(BeansOrder::Episodes);
        assert_eq!(names(&ordered), vec![Some("first"), Some("second")]);
    }

    #[test]
    fn test_reordering_does_not_disturb_the_directory() {
        let directory = BeanDirectory::new(vec![
            bean(Some("Budi"), Some(3)),
            bean(Some("Anna"), Some(9)),
        ]);
        directory.ordered(BeansOrder::Name);
        let ordered = directory.ordered(BeansOrder::Default);
        assert_eq!(names(&ordered), vec![Some("Budi"), Some("Anna")]);
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let directory = BeanDirectory::new(vec![]);
        assert!(!directory.is_fresh(Duration::ZERO));
        assert!(directory.is_fresh(Duration::from_secs(3600)));
    }
}
