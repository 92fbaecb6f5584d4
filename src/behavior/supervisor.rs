use thiserror::Error;

use crate::pet::animation;

/// What the pet should do about the current foreground window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub animation: String,
    pub caption: Option<String>,
}

impl Reaction {
    pub fn idle() -> Self {
        Self {
            animation: animation::IDLE.to_string(),
            caption: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll {
    Unchanged,
    Changed(Reaction),
}

/// Source of reactions while in Supervisor mode.
pub trait SupervisorWatcher {
    fn poll(&mut self) -> Poll;
}

/// Why the foreground window title could not be read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    #[error("no foreground window")]
    NoForegroundWindow,
    #[error("foreground window lookup is not supported on this platform")]
    Unsupported,
    #[error("window title lookup failed: {0}")]
    Os(String),
}

/// Platform lookup of the focused window's title.
pub trait TitleSource {
    fn foreground_title(&mut self) -> Result<String, LookupFailure>;
}

/// Keyword (case-insensitive title substring) to reaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionRule {
    keyword: String,
    animation: String,
    caption: Option<String>,
}

impl ReactionRule {
    pub fn new(keyword: &str, animation: &str, caption: Option<&str>) -> Self {
        Self {
            keyword: keyword.to_lowercase(),
            animation: animation.to_string(),
            caption: caption.map(str::to_string),
        }
    }
}

/// Watches the foreground window and maps title changes to reactions.
pub struct ForegroundWatcher<T> {
    source: T,
    rules: Vec<ReactionRule>,
    last_title: String,
}

impl<T: TitleSource> ForegroundWatcher<T> {
    pub fn new(source: T, rules: Vec<ReactionRule>) -> Self {
        Self {
            source,
            rules,
            last_title: String::new(),
        }
    }

    /// First matching rule wins; no match means idle without a caption.
    fn react_to(&self, title: &str) -> Reaction {
        let lower = title.to_lowercase();
        self.rules
            .iter()
            .find(|rule| !rule.keyword.is_empty() && lower.contains(&rule.keyword))
            .map(|rule| Reaction {
                animation: rule.animation.clone(),
                caption: rule.caption.clone(),
            })
            .unwrap_or_else(Reaction::idle)
    }
}

impl<T: TitleSource> SupervisorWatcher for ForegroundWatcher<T> {
    fn poll(&mut self) -> Poll {
        // Any lookup failure counts as "no window".
        let title = match self.source.foreground_title() {
            Ok(title) => title,
            Err(LookupFailure::NoForegroundWindow) => String::new(),
            Err(e) => {
                log::warn!("{e}; treating as no window");
                String::new()
            }
        };

        if title == self.last_title {
            return Poll::Unchanged;
        }

        let reaction = self.react_to(&title);
        log::info!("active window '{title}' -> {}", reaction.animation);
        self.last_title = title;
        Poll::Changed(reaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Scripted(VecDeque<Result<String, LookupFailure>>);

    impl TitleSource for Scripted {
        fn foreground_title(&mut self) -> Result<String, LookupFailure> {
            self.0.pop_front().unwrap_or(Err(LookupFailure::NoForegroundWindow))
        }
    }

    fn watcher(titles: Vec<Result<String, LookupFailure>>) -> ForegroundWatcher<Scripted> {
        let rules = vec![
            ReactionRule::new("Netflix", animation::JUDGING, Some("Really? Netflix again?")),
            ReactionRule::new("code", animation::TYPING, None),
        ];
        ForegroundWatcher::new(Scripted(titles.into()), rules)
    }

    #[test]
    fn matching_is_case_insensitive_and_first_wins() {
        let mut w = watcher(vec![Ok("NETFLIX - code review".into())]);
        assert_eq!(
            w.poll(),
            Poll::Changed(Reaction {
                animation: animation::JUDGING.into(),
                caption: Some("Really? Netflix again?".into()),
            })
        );
    }

    #[test]
    fn repeated_title_is_unchanged() {
        let mut w = watcher(vec![Ok("VS Code".into()), Ok("VS Code".into())]);
        assert!(matches!(w.poll(), Poll::Changed(_)));
        assert_eq!(w.poll(), Poll::Unchanged);
    }

    #[test]
    fn no_match_yields_idle_without_caption() {
        let mut w = watcher(vec![Ok("Calculator".into())]);
        assert_eq!(w.poll(), Poll::Changed(Reaction::idle()));
    }

    #[test]
    fn lookup_failure_counts_as_no_window() {
        let mut w = watcher(vec![
            Ok("Netflix".into()),
            Err(LookupFailure::Os("access denied".into())),
            Err(LookupFailure::Unsupported),
        ]);
        assert!(matches!(w.poll(), Poll::Changed(_)));
        // Failure after a real window reads as a switch to "no window".
        assert_eq!(w.poll(), Poll::Changed(Reaction::idle()));
        // And a second failure is the same "no window" again.
        assert_eq!(w.poll(), Poll::Unchanged);
    }

    #[test]
    fn initial_empty_title_is_unchanged() {
        let mut w = watcher(vec![Err(LookupFailure::NoForegroundWindow)]);
        assert_eq!(w.poll(), Poll::Unchanged);
    }
}
