use super::BucketFilter;
use crate::classify::Bucket;

/// A key press, independent of the terminal library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Ctrl(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    FocusSearch,
    Blur,
    ToggleFocus,
    Clear,
    Type(char),
    Backspace,
    SwitchBucket(BucketFilter),
    ToggleDiscovery,
    Shuffle,
    SelectNext,
    SelectPrev,
    OpenSelected,
    Reload,
    Quit,
}

/// Map a key to an action.
///
/// Ctrl chords, Esc, Tab and the arrows work regardless of focus. Plain
/// characters, including the numeric bucket shortcuts, go to the search
/// field while it has focus.
pub fn resolve(key: Key, focused: bool) -> Option<Action> {
    let action = match key {
        Key::Ctrl('k') => Action::FocusSearch,
        Key::Ctrl('c') => Action::Quit,
        Key::Ctrl('r') => Action::ToggleDiscovery,
        Key::Ctrl('s') => Action::Shuffle,
        Key::Ctrl('l') => Action::Reload,
        Key::Ctrl(_) => return None,
        Key::Esc => Action::Clear,
        Key::Tab => Action::ToggleFocus,
        Key::Up => Action::SelectPrev,
        Key::Down => Action::SelectNext,
        Key::Enter if focused => Action::Blur,
        Key::Enter => Action::OpenSelected,
        Key::Backspace if focused => Action::Backspace,
        Key::Backspace => return None,
        Key::Char(c) if focused => Action::Type(c),
        Key::Char(c) => match c {
            '/' => Action::FocusSearch,
            '0' => Action::SwitchBucket(BucketFilter::All),
            '1' => Action::SwitchBucket(BucketFilter::Only(Bucket::PrimarySource)),
            '2' => Action::SwitchBucket(BucketFilter::Only(Bucket::Domain)),
            '3' => Action::SwitchBucket(BucketFilter::Only(Bucket::General)),
            'j' => Action::SelectNext,
            'k' => Action::SelectPrev,
            'r' => Action::ToggleDiscovery,
            's' => Action::Shuffle,
            'q' => Action::Quit,
            _ => return None,
        },
    };

    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_switch_buckets_only_without_focus() {
        assert_eq!(
            resolve(Key::Char('2'), false),
            Some(Action::SwitchBucket(BucketFilter::Only(Bucket::Domain)))
        );
        assert_eq!(resolve(Key::Char('2'), true), Some(Action::Type('2')));
        assert_eq!(
            resolve(Key::Char('0'), false),
            Some(Action::SwitchBucket(BucketFilter::All))
        );
    }

    #[test]
    fn global_shortcuts_ignore_focus() {
        for focused in [true, false] {
            assert_eq!(resolve(Key::Ctrl('k'), focused), Some(Action::FocusSearch));
            assert_eq!(resolve(Key::Esc, focused), Some(Action::Clear));
            assert_eq!(resolve(Key::Ctrl('r'), focused), Some(Action::ToggleDiscovery));
        }
    }

    #[test]
    fn slash_focuses_only_without_focus() {
        assert_eq!(resolve(Key::Char('/'), false), Some(Action::FocusSearch));
        assert_eq!(resolve(Key::Char('/'), true), Some(Action::Type('/')));
    }
}
